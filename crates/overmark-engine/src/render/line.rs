use std::sync::OnceLock;

use regex::Regex;

use super::LinkCounter;
use super::inline::render_inline;

const NBSP: &str = "&nbsp;";

/// Renders one raw line to one markup line.
///
/// The steps run in a fixed order; later steps operate on the output of
/// earlier ones and must not re-escape or re-match what those produced:
///
/// 1. HTML-escape `& < > " '`
/// 2. leading spaces become `&nbsp;` runs (exact count, so indentation has
///    identical visual width in both layers)
/// 3. horizontal rule — terminal, no inline processing
/// 4. code fence marker — terminal
/// 5. header (1-3 `#`), 6. blockquote, 7. bullet item, 8. numbered item
/// 9. inline passes (code spans, links, bold, italic)
/// 10. blank lines become a single `&nbsp;` so they keep their height
pub fn render_line(line: &str, links: &mut LinkCounter) -> String {
    let text = markup_indentation(&escape(line));

    if text.is_empty() {
        return NBSP.to_string();
    }

    if hr_re().is_match(&text) {
        return format!("<span class=\"hr-marker\">{text}</span>");
    }

    if text.starts_with("```") {
        return format!("<span class=\"code-fence\">{text}</span>");
    }

    if let Some(caps) = header_re().captures(&text) {
        let marks = caps.get(1).map_or("", |m| m.as_str()).to_string();
        let rest = caps.get(2).map_or("", |m| m.as_str()).to_string();
        let level = marks.len();
        let body = render_inline(&rest, links);
        return format!(
            "<h{level}><span class=\"syntax-marker\">{marks} </span>{body}</h{level}>"
        );
    }

    if let Some(rest) = text.strip_prefix("&gt; ") {
        let body = render_inline(rest, links);
        return format!(
            "<span class=\"blockquote\"><span class=\"syntax-marker\">&gt; </span>{body}</span>"
        );
    }

    if let Some(caps) = bullet_re().captures(&text) {
        let indent = caps.get(1).map_or("", |m| m.as_str()).to_string();
        let marker = caps.get(2).map_or("", |m| m.as_str()).to_string();
        let rest = caps.get(3).map_or("", |m| m.as_str()).to_string();
        let body = render_inline(&rest, links);
        return format!("{indent}<span class=\"list-marker\">{marker} </span>{body}");
    }

    if let Some(caps) = numbered_re().captures(&text) {
        let indent = caps.get(1).map_or("", |m| m.as_str()).to_string();
        let number = caps.get(2).map_or("", |m| m.as_str()).to_string();
        let rest = caps.get(3).map_or("", |m| m.as_str()).to_string();
        let body = render_inline(&rest, links);
        return format!("{indent}<span class=\"list-marker\">{number}. </span>{body}");
    }

    render_inline(&text, links)
}

/// Renders the active line: escaped and indented but unstyled, so the line
/// under the caret shows literal markdown syntax. Keeps the blank-line
/// placeholder so an empty active line still occupies height.
pub(crate) fn render_raw(line: &str) -> String {
    let text = markup_indentation(&escape(line));
    if text.is_empty() {
        return NBSP.to_string();
    }
    text
}

/// True for lines that open or close a fenced code block.
pub(crate) fn is_fence(line: &str) -> bool {
    line.starts_with("```")
}

fn escape(line: &str) -> String {
    html_escape::encode_quoted_attribute(line).into_owned()
}

/// Converts the leading run of spaces to `&nbsp;` markup, one per space.
fn markup_indentation(escaped: &str) -> String {
    let spaces = escaped.len() - escaped.trim_start_matches(' ').len();
    if spaces == 0 {
        return escaped.to_string();
    }
    format!("{}{}", NBSP.repeat(spaces), &escaped[spaces..])
}

fn hr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:-{3,}|\*{3,}|_{3,})$").expect("invalid hr regex"))
}

fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(#{1,3}) (.*)$").expect("invalid header regex"))
}

fn bullet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^((?:&nbsp;)*)([-*]) (.*)$").expect("invalid bullet regex"))
}

fn numbered_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^((?:&nbsp;)*)(\d+)\. (.*)$").expect("invalid numbered-list regex")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn render(line: &str) -> String {
        render_line(line, &mut LinkCounter::new())
    }

    // ============ Escaping and indentation ============

    #[test]
    fn escapes_html_specials() {
        let html = render("a <b> & \"c\"");
        assert!(!html.contains('<') || !html.contains("<b>"));
        assert!(html.contains("&lt;b&gt;"));
        assert!(html.contains("&amp;"));
        assert!(html.contains("&quot;c&quot;"));
    }

    #[test]
    fn no_unescaped_specials_survive() {
        let html = render("<script>\"&'</script>");
        assert!(!html.contains("<script>"));
        assert!(!html.contains('"') || html.contains("&quot;"));
    }

    #[test]
    fn leading_spaces_become_nbsp() {
        assert_eq!(render("   x"), "&nbsp;&nbsp;&nbsp;x");
    }

    #[test]
    fn interior_spaces_are_untouched() {
        assert_eq!(render("a  b"), "a  b");
    }

    #[test]
    fn empty_line_renders_placeholder() {
        assert_eq!(render(""), "&nbsp;");
    }

    #[test]
    fn rendering_is_idempotent_across_calls() {
        let line = "## **bold** and `code`";
        assert_eq!(render(line), render(line));
    }

    // ============ Block classification ============

    #[rstest]
    #[case("---")]
    #[case("----")]
    #[case("***")]
    #[case("___")]
    fn horizontal_rules(#[case] line: &str) {
        let html = render(line);
        assert_eq!(html, format!("<span class=\"hr-marker\">{line}</span>"));
    }

    #[test]
    fn hr_gets_no_inline_processing() {
        // The asterisks in a rule must not be read as emphasis markers
        let html = render("***");
        assert!(!html.contains("<em>"));
        assert!(!html.contains("<strong>"));
    }

    #[test]
    fn two_dashes_are_not_a_rule() {
        assert!(!render("--").contains("hr-marker"));
    }

    #[test]
    fn code_fence_marker_is_terminal() {
        let html = render("```rust");
        assert_eq!(html, "<span class=\"code-fence\">```rust</span>");
    }

    #[test]
    fn header_level_two() {
        let html = render("## Hello");
        assert_eq!(
            html,
            "<h2><span class=\"syntax-marker\">## </span>Hello</h2>"
        );
    }

    #[rstest]
    #[case("# h", 1)]
    #[case("## h", 2)]
    #[case("### h", 3)]
    fn header_levels(#[case] line: &str, #[case] level: usize) {
        assert!(render(line).starts_with(&format!("<h{level}>")));
    }

    #[test]
    fn four_hashes_are_not_a_header() {
        let html = render("#### deep");
        assert!(!html.contains("<h"));
    }

    #[test]
    fn hash_without_space_is_not_a_header() {
        assert!(!render("#tag").contains("<h1>"));
    }

    #[test]
    fn blockquote_keeps_visible_marker() {
        let html = render("> quoted");
        assert_eq!(
            html,
            "<span class=\"blockquote\"><span class=\"syntax-marker\">&gt; </span>quoted</span>"
        );
    }

    #[rstest]
    #[case("- item", "-")]
    #[case("* item", "*")]
    fn bullet_items(#[case] line: &str, #[case] marker: &str) {
        let html = render(line);
        assert_eq!(
            html,
            format!("<span class=\"list-marker\">{marker} </span>item")
        );
    }

    #[test]
    fn indented_bullet_keeps_indentation() {
        let html = render("  - item");
        assert_eq!(
            html,
            "&nbsp;&nbsp;<span class=\"list-marker\">- </span>item"
        );
    }

    #[test]
    fn numbered_item_preserves_number() {
        let html = render("12. item");
        assert_eq!(html, "<span class=\"list-marker\">12. </span>item");
    }

    #[test]
    fn dash_without_space_is_plain_text() {
        assert_eq!(render("-item"), "-item");
    }

    // ============ Inline composition inside blocks ============

    #[test]
    fn header_contains_styled_inline() {
        let html = render("# **hi**");
        assert!(html.contains("<h1>"));
        assert!(html.contains("<strong>"));
    }

    #[test]
    fn quote_contains_styled_inline() {
        let html = render("> *em*");
        assert!(html.contains("blockquote"));
        assert!(html.contains("<em>"));
    }
}
