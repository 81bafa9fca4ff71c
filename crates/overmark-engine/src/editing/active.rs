//! Heuristic detection of which formats apply at the current selection,
//! used to highlight toolbar toggles. This is a proximity scan, not a
//! parser: it examines the caret's line for line styles and a bounded
//! window around the selection for paired inline markers, and is allowed to
//! be approximate.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::selection::{line_end, line_start};
use super::style::HeaderLevel;

/// How far around the selection the inline-marker scan looks, in bytes.
const SCAN_WINDOW: usize = 100;

/// Formats detected at a selection. Drives toggle-button state only; not
/// correctness-critical.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveFormats {
    pub bold: bool,
    pub italic: bool,
    pub code: bool,
    pub link: bool,
    pub quote: bool,
    pub bullet_list: bool,
    pub numbered_list: bool,
    pub task_list: bool,
    pub header: Option<HeaderLevel>,
}

/// Reports the formats active at `selection`.
pub fn active_formats(buffer: &str, selection: Range<usize>) -> ActiveFormats {
    let start = selection.start.min(buffer.len());
    let end = selection.end.clamp(start, buffer.len());

    let ls = line_start(buffer, start);
    let le = line_end(buffer, ls);
    let line = &buffer[ls..le];

    let task_list = line.starts_with("- [ ] ") || line.starts_with("- [x] ");
    let bullet_list = !task_list && (line.starts_with("- ") || line.starts_with("* "));
    let numbered_list = numbered_re().is_match(line);
    let quote = line.starts_with("> ");
    let header = header_re()
        .captures(line)
        .and_then(|caps| HeaderLevel::new(caps[1].len() as u8).ok());

    // Inline styles: scan a bounded window around the selection
    let mut w0 = start.saturating_sub(SCAN_WINDOW);
    while !buffer.is_char_boundary(w0) {
        w0 -= 1;
    }
    let mut w1 = (end + SCAN_WINDOW).min(buffer.len());
    while !buffer.is_char_boundary(w1) {
        w1 += 1;
    }
    let before = &buffer[w0..start];
    let after = &buffer[end..w1];

    // An odd number of markers before the caret means one of them opened a
    // span the caret now sits in; a marker ahead can close it
    let bold = (before.matches("**").count() + before.matches("__").count()) % 2 == 1
        && (after.contains("**") || after.contains("__"));
    let italic = (count_single(before, b'*') + count_single(before, b'_')) % 2 == 1
        && (count_single(after, b'*') + count_single(after, b'_')) > 0;

    // Backticks pair within one line
    let line_before = &buffer[ls..start];
    let line_after = &buffer[end..le.max(end)];
    let code = line_before.matches('`').count() % 2 == 1 && line_after.contains('`');

    let link = link_re().find_iter(&buffer[w0..w1]).any(|m| {
        w0 + m.start() <= start && end <= w0 + m.end()
    });

    ActiveFormats {
        bold,
        italic,
        code,
        link,
        quote,
        bullet_list,
        numbered_list,
        task_list,
        header,
    }
}

/// Counts marker bytes that are not part of a doubled run.
fn count_single(text: &str, marker: u8) -> usize {
    let bytes = text.as_bytes();
    let mut count = 0;
    for i in 0..bytes.len() {
        if bytes[i] == marker
            && (i == 0 || bytes[i - 1] != marker)
            && bytes.get(i + 1) != Some(&marker)
        {
            count += 1;
        }
    }
    count
}

fn numbered_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\. ").expect("invalid list-marker regex"))
}

fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(#{1,3}) ").expect("invalid header regex"))
}

fn link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[([^\]]*)\]\(([^)]*)\)").expect("invalid link regex"))
}
