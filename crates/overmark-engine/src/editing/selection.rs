//! Selection expansion helpers over a plain string buffer.
//!
//! All positions are byte offsets the host hands us from its input surface;
//! callers are expected to pass offsets on character boundaries.

use std::ops::Range;

/// Finds the start of the line containing `offset`.
pub(crate) fn line_start(text: &str, offset: usize) -> usize {
    match text[..offset].rfind('\n') {
        Some(newline_pos) => newline_pos + 1,
        None => 0,
    }
}

/// Finds the end of the line containing `offset`: the position of the next
/// `\n`, or the buffer end for the last line.
pub(crate) fn line_end(text: &str, offset: usize) -> usize {
    match text[offset..].find('\n') {
        Some(newline_pos) => offset + newline_pos,
        None => text.len(),
    }
}

/// Snaps a selection outward to whole lines. A collapsed caret becomes its
/// own line; the last line of the buffer is bounded by the buffer end, not
/// an implied trailing newline.
pub(crate) fn expand_to_lines(text: &str, sel: Range<usize>) -> Range<usize> {
    line_start(text, sel.start)..line_end(text, sel.end)
}

/// Expands a collapsed caret to the enclosing word: left across the
/// preceding non-whitespace run, right up to the next whitespace (or the
/// next newline for multiline-aware styles).
pub(crate) fn expand_to_word(text: &str, caret: usize, multiline: bool) -> Range<usize> {
    let start = match text[..caret].rfind(char::is_whitespace) {
        Some(pos) => pos + text[pos..].chars().next().map_or(1, char::len_utf8),
        None => 0,
    };
    let end = if multiline {
        line_end(text, caret)
    } else {
        match text[caret..].find(char::is_whitespace) {
            Some(pos) => caret + pos,
            None => text.len(),
        }
    };
    start..end.max(caret)
}

/// Splits text into leading whitespace, trimmed interior, and trailing
/// whitespace.
pub(crate) fn split_whitespace_edges(text: &str) -> (&str, &str, &str) {
    let trimmed_start = text.trim_start();
    let lead = &text[..text.len() - trimmed_start.len()];
    let inner = trimmed_start.trim_end();
    let trail = &trimmed_start[inner.len()..];
    (lead, inner, trail)
}
