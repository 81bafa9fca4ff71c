use std::sync::OnceLock;

use regex::{Captures, Regex};

use super::LinkCounter;

// Placeholder sentinels for content that later passes must not see.
// NUL/SOH cannot appear in escaped text, so round-tripping is unambiguous.
const CODE_MARK: char = '\u{0}';
const URL_MARK: char = '\u{1}';

/// Applies the inline passes in fixed order: code spans are extracted to
/// opaque placeholders first (so emphasis and link scanning cannot see
/// inside them), then links, bold, and italic run, and finally the
/// placeholders are substituted back.
pub(super) fn render_inline(text: &str, links: &mut LinkCounter) -> String {
    let mut code_spans = Vec::new();
    let mut urls = Vec::new();

    let text = extract_code_spans(text, &mut code_spans);
    let text = link_pass(&text, links, &mut urls);
    let text = bold_pass(&text);
    let text = italic_pass(&text, b'*');
    let text = italic_pass(&text, b'_');

    let text = restore(&text, URL_MARK, &urls);
    restore(&text, CODE_MARK, &code_spans)
}

fn extract_code_spans(text: &str, spans: &mut Vec<String>) -> String {
    code_re()
        .replace_all(text, |caps: &Captures| {
            let markup = format!(
                "<code><span class=\"syntax-marker\">`</span>{}<span class=\"syntax-marker\">`</span></code>",
                &caps[1]
            );
            spans.push(markup);
            format!("{CODE_MARK}{}{CODE_MARK}", spans.len() - 1)
        })
        .into_owned()
}

/// Rewrites `[text](url)` occurrences, assigning each a sequential
/// `link-N` anchor. The url text is swapped for a placeholder so the
/// emphasis passes cannot match marker characters inside it.
fn link_pass(text: &str, links: &mut LinkCounter, urls: &mut Vec<String>) -> String {
    link_re()
        .replace_all(text, |caps: &Captures| {
            let label = &caps[1];
            urls.push(caps[2].to_string());
            let ph = format!("{URL_MARK}{}{URL_MARK}", urls.len() - 1);
            let index = links.take();
            format!(
                "<span class=\"syntax-marker\">[</span><a href=\"{ph}\" data-anchor=\"link-{index}\">{label}</a><span class=\"syntax-marker\">]({ph})</span>"
            )
        })
        .into_owned()
}

fn bold_pass(text: &str) -> String {
    let text = bold_star_re().replace_all(text, |caps: &Captures| {
        format!(
            "<strong><span class=\"syntax-marker\">**</span>{}<span class=\"syntax-marker\">**</span></strong>",
            &caps[1]
        )
    });
    bold_underscore_re()
        .replace_all(&text, |caps: &Captures| {
            format!(
                "<strong><span class=\"syntax-marker\">__</span>{}<span class=\"syntax-marker\">__</span></strong>",
                &caps[1]
            )
        })
        .into_owned()
}

/// Wraps `*x*` / `_x_` in `<em>` using a manual scan: a marker only opens
/// or closes emphasis when it is not adjacent to another marker of the same
/// kind, so the doubled markers of bold runs are never misread as italic.
fn italic_pass(text: &str, marker: u8) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut seg_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == marker
            && (i == 0 || bytes[i - 1] != marker)
            && bytes.get(i + 1) != Some(&marker)
            && let Some(close) = find_single_marker(bytes, i + 1, marker)
        {
            let m = marker as char;
            let inner = &text[i + 1..close];
            out.push_str(&text[seg_start..i]);
            out.push_str(&format!(
                "<em><span class=\"syntax-marker\">{m}</span>{inner}<span class=\"syntax-marker\">{m}</span></em>"
            ));
            i = close + 1;
            seg_start = i;
        } else {
            i += 1;
        }
    }

    out.push_str(&text[seg_start..]);
    out
}

/// Finds the next lone `marker` byte at or after `from`. Returns `None`
/// when the candidate is missing, immediately adjacent (empty emphasis), or
/// part of a doubled run.
fn find_single_marker(bytes: &[u8], from: usize, marker: u8) -> Option<usize> {
    let mut k = from;
    while k < bytes.len() && bytes[k] != marker {
        k += 1;
    }
    if k >= bytes.len() || k == from {
        return None;
    }
    if bytes.get(k + 1) == Some(&marker) {
        return None;
    }
    Some(k)
}

fn restore(text: &str, mark: char, stored: &[String]) -> String {
    let mut out = text.to_string();
    for (i, s) in stored.iter().enumerate() {
        out = out.replace(&format!("{mark}{i}{mark}"), s);
    }
    out
}

fn code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"`([^`]+)`").expect("invalid code-span regex"))
}

fn link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[([^\]]*)\]\(([^)]*)\)").expect("invalid link regex"))
}

fn bold_star_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*([^*]+)\*\*").expect("invalid bold regex"))
}

fn bold_underscore_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"__([^_]+)__").expect("invalid bold regex"))
}
