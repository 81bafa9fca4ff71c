//! Toggle application for formatting commands.
//!
//! Everything here is a pure function over `(buffer, selection)`. Toggling
//! works by re-scanning the text around the selection for existing markers,
//! which is heuristic by design: an adjacent, unrelated marker character can
//! be picked up as a style boundary. That is the documented behavior of the
//! system, not a defect to patch around.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use super::patch::EditPatch;
use super::selection::{
    expand_to_lines, expand_to_word, line_end, line_start, split_whitespace_edges,
};
use super::style::{FormatCmd, FormatStyle, HeaderLevel};

/// Applies a formatting command, returning the replacement text and the new
/// selection. Applying the same command to its own output toggles back.
pub fn apply_format(buffer: &str, selection: Range<usize>, cmd: &FormatCmd) -> EditPatch {
    let selection = clamp(selection, buffer.len());
    match cmd {
        FormatCmd::Header(level) => toggle_header(buffer, selection, *level),
        FormatCmd::BulletList => toggle_list(buffer, selection, ListKind::Bullet),
        FormatCmd::NumberedList => toggle_list(buffer, selection, ListKind::Numbered),
        FormatCmd::Quote | FormatCmd::TaskList => {
            toggle_line_prefix(buffer, selection, &cmd.style())
        }
        FormatCmd::Bold | FormatCmd::Italic | FormatCmd::Code | FormatCmd::Link => {
            toggle_inline(buffer, selection, &cmd.style())
        }
    }
}

fn clamp(sel: Range<usize>, len: usize) -> Range<usize> {
    let start = sel.start.min(len);
    start..sel.end.clamp(start, len)
}

/// Splices `replacement` over `range`, producing the full new text.
fn splice(buffer: &str, range: Range<usize>, replacement: &str, selection: Range<usize>) -> EditPatch {
    let mut text = String::with_capacity(buffer.len() - range.len() + replacement.len());
    text.push_str(&buffer[..range.start]);
    text.push_str(replacement);
    text.push_str(&buffer[range.end..]);
    EditPatch { text, selection }
}

// ============ Inline styles (bold, italic, code, link) ============

fn toggle_inline(buffer: &str, selection: Range<usize>, style: &FormatStyle) -> EditPatch {
    let mut sel = if selection.start == selection.end {
        expand_to_word(buffer, selection.start, style.multiline)
    } else {
        selection
    };

    // Multiline code selections switch to fenced-block markers
    let use_block = !style.block_prefix.is_empty() && buffer[sel.clone()].contains('\n');
    let (prefix, suffix) = if use_block {
        (
            format!("{}\n", style.block_prefix),
            format!("\n{}", style.block_suffix),
        )
    } else {
        (style.prefix.to_string(), style.suffix.to_string())
    };

    // A selection whose immediate outside already holds the markers extends
    // over them, so toggling off works from the inner text too
    if sel.start >= prefix.len()
        && buffer[..sel.start].ends_with(prefix.as_str())
        && buffer[sel.end..].starts_with(suffix.as_str())
    {
        sel = (sel.start - prefix.len())..(sel.end + suffix.len());
    }

    let selected = &buffer[sel.clone()];
    let (lead, inner, trail) = if style.trim_first {
        split_whitespace_edges(selected)
    } else {
        ("", selected, "")
    };

    if inner.len() >= prefix.len() + suffix.len()
        && inner.starts_with(prefix.as_str())
        && inner.ends_with(suffix.as_str())
    {
        // Toggle off: strip the markers, select the inner text
        let stripped = &inner[prefix.len()..inner.len() - suffix.len()];
        let replacement = format!("{lead}{stripped}{trail}");
        let new_start = sel.start + lead.len();
        return splice(buffer, sel, &replacement, new_start..new_start + stripped.len());
    }

    if let Some(placeholder) = style.replace_next {
        if !inner.is_empty() && style.scan_for.is_some() && url_re().is_match(inner) {
            // The selection is the link target: substitute it into the
            // placeholder and park the caret where the label goes
            let replacement = format!(
                "{lead}{prefix}{}{trail}",
                suffix.replacen(placeholder, inner, 1)
            );
            let caret = sel.start + lead.len() + prefix.len();
            return splice(buffer, sel, &replacement, caret..caret);
        }
        // Wrap, selecting the placeholder so the target can be typed next
        let replacement = format!("{lead}{prefix}{inner}{suffix}{trail}");
        let ph = suffix.find(placeholder).unwrap_or(0);
        let ph_start = sel.start + lead.len() + prefix.len() + inner.len() + ph;
        return splice(buffer, sel, &replacement, ph_start..ph_start + placeholder.len());
    }

    let replacement = format!("{lead}{prefix}{inner}{suffix}{trail}");
    let inner_start = sel.start + lead.len() + prefix.len();
    splice(buffer, sel, &replacement, inner_start..inner_start + inner.len())
}

fn url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^https?://\S+$").expect("invalid URL regex"))
}

// ============ Line-prefix styles (quote, task list) ============

/// One marker insertion or removal at a line start, in old-buffer offsets.
struct LineEdit {
    at: usize,
    removed: usize,
    added: usize,
}

/// Maps an old-buffer offset through a sequence of line-start edits. An
/// offset inside a removed marker snaps to just after the replacement; the
/// result never crosses back over `floor` (the block start).
fn map_offset(x: usize, edits: &[LineEdit], floor: usize) -> usize {
    let mut delta: isize = 0;
    for e in edits {
        if e.at + e.removed <= x {
            delta += e.added as isize - e.removed as isize;
        } else if e.at <= x {
            let snapped = e.at as isize + delta + e.added as isize;
            return snapped.max(floor as isize) as usize;
        } else {
            break;
        }
    }
    (x as isize + delta).max(floor as isize) as usize
}

fn toggle_line_prefix(buffer: &str, selection: Range<usize>, style: &FormatStyle) -> EditPatch {
    let block = expand_to_lines(buffer, selection.clone());
    let text = &buffer[block.clone()];
    let lines: Vec<&str> = text.split('\n').collect();
    let all_prefixed = lines.iter().all(|l| l.starts_with(style.prefix));

    let mut edits = Vec::with_capacity(lines.len());
    let mut new_text = String::with_capacity(text.len() + lines.len() * style.prefix.len());
    let mut at = block.start;
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            new_text.push('\n');
        }
        if all_prefixed {
            edits.push(LineEdit {
                at,
                removed: style.prefix.len(),
                added: 0,
            });
            new_text.push_str(&line[style.prefix.len()..]);
        } else {
            edits.push(LineEdit {
                at,
                removed: 0,
                added: style.prefix.len(),
            });
            new_text.push_str(style.prefix);
            new_text.push_str(line);
        }
        at += line.len() + 1;
    }

    // Separate a freshly applied block from adjacent non-blank content
    let (prepend, append) = if style.surround_with_newlines && !all_prefixed {
        (
            newline_deficit_before(buffer, block.start),
            newline_deficit_after(buffer, block.end),
        )
    } else {
        (0, 0)
    };

    let start = map_offset(selection.start, &edits, block.start) + prepend;
    let end = map_offset(selection.end, &edits, block.start) + prepend;
    let replacement = format!(
        "{}{}{}",
        "\n".repeat(prepend),
        new_text,
        "\n".repeat(append)
    );
    splice(buffer, block, &replacement, start..end.max(start))
}

/// Newlines to insert so two separate the block from what precedes it.
fn newline_deficit_before(buffer: &str, at: usize) -> usize {
    if at == 0 {
        return 0;
    }
    let existing = buffer[..at].chars().rev().take_while(|&c| c == '\n').count();
    2usize.saturating_sub(existing).min(at)
}

fn newline_deficit_after(buffer: &str, at: usize) -> usize {
    if at == buffer.len() {
        return 0;
    }
    let existing = buffer[at..].chars().take_while(|&c| c == '\n').count();
    2usize.saturating_sub(existing)
}

// ============ List styles ============

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Bullet,
    Numbered,
}

/// Byte length of the line's list marker of the given kind, if present.
fn list_marker_len(line: &str, kind: ListKind) -> Option<usize> {
    match kind {
        ListKind::Bullet => {
            if line.starts_with("- ") || line.starts_with("* ") {
                Some(2)
            } else {
                None
            }
        }
        ListKind::Numbered => numbered_marker_re().find(line).map(|m| m.len()),
    }
}

fn numbered_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\. ").expect("invalid list-marker regex"))
}

/// Bullet and numbered lists are mutually exclusive: applying one strips the
/// other's markers first, so toggling converts rather than stacks. Numbered
/// markers regenerate `1. 2. 3.` from the top of the block.
fn toggle_list(buffer: &str, selection: Range<usize>, kind: ListKind) -> EditPatch {
    let block = expand_to_lines(buffer, selection.clone());
    let text = &buffer[block.clone()];
    let lines: Vec<&str> = text.split('\n').collect();
    let all_in_kind = lines
        .iter()
        .all(|l| list_marker_len(l, kind).is_some());

    let mut edits = Vec::with_capacity(lines.len());
    let mut new_text = String::with_capacity(text.len() + lines.len() * 3);
    let mut at = block.start;
    let mut number = 1;
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            new_text.push('\n');
        }
        if all_in_kind {
            // Fully in the requested style: remove list styling entirely
            let removed = list_marker_len(line, kind).unwrap_or(0);
            edits.push(LineEdit { at, removed, added: 0 });
            new_text.push_str(&line[removed..]);
        } else {
            let removed = list_marker_len(line, ListKind::Bullet)
                .or_else(|| list_marker_len(line, ListKind::Numbered))
                .unwrap_or(0);
            let marker = match kind {
                ListKind::Bullet => "- ".to_string(),
                ListKind::Numbered => {
                    let m = format!("{number}. ");
                    number += 1;
                    m
                }
            };
            edits.push(LineEdit {
                at,
                removed,
                added: marker.len(),
            });
            new_text.push_str(&marker);
            new_text.push_str(&line[removed..]);
        }
        at += line.len() + 1;
    }

    let start = map_offset(selection.start, &edits, block.start);
    let end = map_offset(selection.end, &edits, block.start);
    splice(buffer, block, &new_text, start..end.max(start))
}

// ============ Headers ============

fn header_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#{1,6} ").expect("invalid header-prefix regex"))
}

/// Strips any existing header prefix from the caret's line, then applies the
/// requested level unless that was exactly the level just stripped (toggle
/// off). Changing level therefore replaces in one step and never stacks.
fn toggle_header(buffer: &str, selection: Range<usize>, level: HeaderLevel) -> EditPatch {
    let ls = line_start(buffer, selection.start);
    let le = line_end(buffer, ls);
    let line = &buffer[ls..le];

    let old_len = header_prefix_re().find(line).map_or(0, |m| m.len());
    let new_prefix = if &line[..old_len] == level.prefix() {
        ""
    } else {
        level.prefix()
    };

    let replacement = format!("{new_prefix}{}", &line[old_len..]);
    let edits = [LineEdit {
        at: ls,
        removed: old_len,
        added: new_prefix.len(),
    }];
    let start = map_offset(selection.start, &edits, ls);
    let end = map_offset(selection.end, &edits, ls);
    splice(buffer, ls..le, &replacement, start..end.max(start))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn header(level: u8) -> FormatCmd {
        FormatCmd::Header(HeaderLevel::new(level).unwrap())
    }

    // ============ Bold/italic inline toggles ============

    #[test]
    fn bold_collapsed_caret_wraps_enclosing_word() {
        let patch = apply_format("hello world", 2..2, &FormatCmd::Bold);
        assert_eq!(patch.text, "**hello** world");
        assert_eq!(patch.selection, 2..7);
    }

    #[test]
    fn bold_toggle_is_inverse_for_collapsed_caret() {
        let patch = apply_format("hello world", 2..2, &FormatCmd::Bold);
        let back = apply_format(&patch.text, patch.selection, &FormatCmd::Bold);
        assert_eq!(back.text, "hello world");
        assert_eq!(back.selection, 0..5);
    }

    #[test]
    fn bold_toggle_is_inverse_for_whole_selection() {
        let patch = apply_format("hello world", 0..5, &FormatCmd::Bold);
        assert_eq!(patch.text, "**hello** world");
        let back = apply_format(&patch.text, patch.selection, &FormatCmd::Bold);
        assert_eq!(back.text, "hello world");
    }

    #[test]
    fn bold_keeps_whitespace_outside_markers() {
        let patch = apply_format("  word  ", 0..8, &FormatCmd::Bold);
        assert_eq!(patch.text, "  **word**  ");
        assert_eq!(patch.selection, 4..8);
    }

    #[test]
    fn bold_whitespace_case_is_inverse() {
        let patch = apply_format("  word  ", 0..8, &FormatCmd::Bold);
        let back = apply_format(&patch.text, patch.selection, &FormatCmd::Bold);
        assert_eq!(back.text, "  word  ");
    }

    #[test]
    fn italic_wraps_selection() {
        let patch = apply_format("a b", 0..1, &FormatCmd::Italic);
        assert_eq!(patch.text, "*a* b");
        assert_eq!(patch.selection, 1..2);
    }

    #[test]
    fn italic_toggle_is_inverse() {
        let patch = apply_format("a b", 0..1, &FormatCmd::Italic);
        let back = apply_format(&patch.text, patch.selection, &FormatCmd::Italic);
        assert_eq!(back.text, "a b");
    }

    #[test]
    fn selecting_inner_text_of_styled_run_toggles_off() {
        // The markers sit just outside the selection; they are picked up
        let patch = apply_format("**hello** world", 2..7, &FormatCmd::Bold);
        assert_eq!(patch.text, "hello world");
        assert_eq!(patch.selection, 0..5);
    }

    #[test]
    fn bold_on_empty_buffer_inserts_markers() {
        let patch = apply_format("", 0..0, &FormatCmd::Bold);
        assert_eq!(patch.text, "****");
        assert_eq!(patch.selection, 2..2);
    }

    // ============ Code ============

    #[test]
    fn code_collapsed_caret_wraps_word() {
        let patch = apply_format("word", 2..2, &FormatCmd::Code);
        assert_eq!(patch.text, "`word`");
        assert_eq!(patch.selection, 1..5);
    }

    #[test]
    fn code_multiline_selection_uses_fences() {
        let patch = apply_format("a\nb", 0..3, &FormatCmd::Code);
        assert_eq!(patch.text, "```\na\nb\n```");
        assert_eq!(patch.selection, 4..7);
    }

    #[test]
    fn code_block_toggle_is_inverse() {
        let patch = apply_format("a\nb", 0..3, &FormatCmd::Code);
        let back = apply_format(&patch.text, patch.selection, &FormatCmd::Code);
        assert_eq!(back.text, "a\nb");
        assert_eq!(back.selection, 0..3);
    }

    #[test]
    fn code_inline_toggle_is_inverse() {
        let patch = apply_format("word", 2..2, &FormatCmd::Code);
        let back = apply_format(&patch.text, patch.selection, &FormatCmd::Code);
        assert_eq!(back.text, "word");
    }

    // ============ Link ============

    #[test]
    fn link_with_url_selected_fills_placeholder() {
        let patch = apply_format("visit https://x.com now", 6..19, &FormatCmd::Link);
        assert_eq!(patch.text, "visit [](https://x.com) now");
        // Caret parked inside the brackets, ready for the label
        assert_eq!(patch.selection, 7..7);
    }

    #[test]
    fn link_with_text_selected_selects_placeholder() {
        let patch = apply_format("click here", 6..10, &FormatCmd::Link);
        assert_eq!(patch.text, "click [here](url)");
        assert_eq!(&patch.text[patch.selection.clone()], "url");
    }

    #[test]
    fn link_unwraps_from_label_selection() {
        let patch = apply_format("click [here](url)", 7..11, &FormatCmd::Link);
        assert_eq!(patch.text, "click here");
        assert_eq!(patch.selection, 6..10);
    }

    // ============ Quote ============

    #[test]
    fn quote_collapsed_caret_prefixes_line() {
        let patch = apply_format("hello", 2..2, &FormatCmd::Quote);
        assert_eq!(patch.text, "> hello");
        assert_eq!(patch.selection, 4..4);
    }

    #[test]
    fn quote_toggle_is_inverse_for_collapsed_caret() {
        let patch = apply_format("hello", 2..2, &FormatCmd::Quote);
        let back = apply_format(&patch.text, patch.selection, &FormatCmd::Quote);
        assert_eq!(back.text, "hello");
        assert_eq!(back.selection, 2..2);
    }

    #[test]
    fn quote_prefixes_every_selected_line() {
        let patch = apply_format("a\nb", 0..3, &FormatCmd::Quote);
        assert_eq!(patch.text, "> a\n> b");
        // Offsets shift by the prefix length added before them
        assert_eq!(patch.selection, 2..7);
    }

    #[test]
    fn quote_toggle_is_inverse_for_whole_selection() {
        let patch = apply_format("a\nb", 0..3, &FormatCmd::Quote);
        let back = apply_format(&patch.text, patch.selection, &FormatCmd::Quote);
        assert_eq!(back.text, "a\nb");
        assert_eq!(back.selection, 0..3);
    }

    #[test]
    fn quote_separates_from_adjacent_content() {
        let patch = apply_format("para\nhello", 7..7, &FormatCmd::Quote);
        assert_eq!(patch.text, "para\n\n> hello");
        assert_eq!(patch.selection, 10..10);
    }

    #[test]
    fn quote_inserts_only_the_newline_deficit() {
        // Already separated by a blank line: nothing extra is added
        let patch = apply_format("para\n\nhello", 8..8, &FormatCmd::Quote);
        assert_eq!(patch.text, "para\n\n> hello");
    }

    // ============ Task list ============

    #[test]
    fn task_list_prefixes_line() {
        let patch = apply_format("todo", 0..0, &FormatCmd::TaskList);
        assert_eq!(patch.text, "- [ ] todo");
        assert_eq!(patch.selection, 6..6);
    }

    #[test]
    fn task_list_toggle_is_inverse() {
        let patch = apply_format("todo", 0..0, &FormatCmd::TaskList);
        let back = apply_format(&patch.text, patch.selection, &FormatCmd::TaskList);
        assert_eq!(back.text, "todo");
        assert_eq!(back.selection, 0..0);
    }

    // ============ Bullet and numbered lists ============

    #[test]
    fn bullet_list_prefixes_selected_lines() {
        let patch = apply_format("a\nb", 0..3, &FormatCmd::BulletList);
        assert_eq!(patch.text, "- a\n- b");
    }

    #[test]
    fn bullet_list_toggle_is_inverse() {
        let patch = apply_format("a\nb", 0..3, &FormatCmd::BulletList);
        let back = apply_format(&patch.text, patch.selection, &FormatCmd::BulletList);
        assert_eq!(back.text, "a\nb");
    }

    #[test]
    fn numbered_list_numbers_from_the_top() {
        let patch = apply_format("a\nb\nc", 0..5, &FormatCmd::NumberedList);
        assert_eq!(patch.text, "1. a\n2. b\n3. c");
    }

    #[test]
    fn numbered_list_toggle_is_inverse() {
        let patch = apply_format("a\nb", 0..3, &FormatCmd::NumberedList);
        let back = apply_format(&patch.text, patch.selection, &FormatCmd::NumberedList);
        assert_eq!(back.text, "a\nb");
    }

    #[test]
    fn numbered_over_bullet_converts_markers() {
        let patch = apply_format("- a\n- b", 0..7, &FormatCmd::NumberedList);
        assert_eq!(patch.text, "1. a\n2. b");
    }

    #[test]
    fn bullet_over_numbered_converts_markers() {
        let patch = apply_format("1. a\n2. b", 0..9, &FormatCmd::BulletList);
        assert_eq!(patch.text, "- a\n- b");
    }

    #[test]
    fn fully_numbered_block_toggles_off_instead_of_renumbering() {
        let patch = apply_format("3. x\n7. y", 0..9, &FormatCmd::NumberedList);
        assert_eq!(patch.text, "x\ny");
    }

    #[test]
    fn mixed_block_is_renumbered_in_order() {
        let patch = apply_format("3. x\ny", 0..6, &FormatCmd::NumberedList);
        assert_eq!(patch.text, "1. x\n2. y");
    }

    #[test]
    fn asterisk_bullets_convert_too() {
        let patch = apply_format("* a\n* b", 0..7, &FormatCmd::NumberedList);
        assert_eq!(patch.text, "1. a\n2. b");
    }

    // ============ Headers ============

    #[test]
    fn header_applies_to_caret_line() {
        let patch = apply_format("x", 0..0, &header(2));
        assert_eq!(patch.text, "## x");
        assert_eq!(patch.selection, 3..3);
    }

    #[test]
    fn header_same_level_toggles_off() {
        let patch = apply_format("## x", 3..3, &header(2));
        assert_eq!(patch.text, "x");
        assert_eq!(patch.selection, 0..0);
    }

    #[test]
    fn header_level_change_replaces_never_stacks() {
        let patch = apply_format("## x", 3..3, &header(3));
        assert_eq!(patch.text, "### x");
        assert!(!patch.text.contains("### ##"));
    }

    #[test]
    fn header_toggle_is_inverse() {
        let patch = apply_format("x", 0..0, &header(1));
        let back = apply_format(&patch.text, patch.selection, &header(1));
        assert_eq!(back.text, "x");
        assert_eq!(back.selection, 0..0);
    }

    #[test]
    fn header_on_second_line_leaves_first_alone() {
        let patch = apply_format("one\ntwo", 5..5, &header(1));
        assert_eq!(patch.text, "one\n# two");
    }

    // ============ Defensive input handling ============

    #[test]
    fn selection_past_buffer_end_is_clamped() {
        let patch = apply_format("ab", 10..20, &FormatCmd::Bold);
        // Degrades to wrapping the trailing word, never a panic
        assert_eq!(patch.text, "**ab**");
    }
}
