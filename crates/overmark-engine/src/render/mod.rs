//! Markdown-to-markup line renderer.
//!
//! Each raw text line maps to exactly one markup line so the preview layer
//! stays vertically aligned with the raw input layer. Literal markdown
//! control characters are kept in the output inside `syntax-marker` spans so
//! they stay visually present (de-emphasized by the host stylesheet) and the
//! two layers keep identical column widths.
//!
//! Markup vocabulary produced here (stable, hosts style on top of it):
//!
//! - line container: `<div class="line">…</div>`, with `raw-line` added for
//!   the active raw line and `in-code-block` for lines between fence pairs
//! - headers: `<h1>`..`<h3>` wrapping the marker span and inline content
//! - horizontal rule: `<span class="hr-marker">`
//! - code fence marker: `<span class="code-fence">`
//! - blockquote: `<span class="blockquote">`
//! - list markers: `<span class="list-marker">`
//! - inline: `<strong>`, `<em>`, `<code>`, and links as
//!   `<a href="…" data-anchor="link-N">` where N counts links from the top
//!   of the document within one render pass

mod inline;
mod line;

pub use line::render_line;

/// Sequential index source for link anchors within one document render.
///
/// Threaded through the render calls as an explicit value so there is no
/// ambient counter shared between documents. Indices are stable within one
/// pass and meaningless across passes.
#[derive(Debug, Default)]
pub struct LinkCounter {
    next: usize,
}

impl LinkCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next link index, starting at 0.
    pub(crate) fn take(&mut self) -> usize {
        let i = self.next;
        self.next += 1;
        i
    }
}

/// Renders a whole document to markup, one container per raw line.
///
/// `active_line`, when set, names the line to render as escaped raw text
/// instead of styled markup, so the line under the caret shows its literal
/// markdown syntax while every other line shows styled markup.
///
/// The link counter resets here, so re-rendering the same text yields the
/// same `link-N` anchors.
pub fn render_document(text: &str, active_line: Option<usize>) -> String {
    let mut links = LinkCounter::new();
    let mut lines = Vec::new();

    for (i, raw) in text.split('\n').enumerate() {
        if active_line == Some(i) {
            lines.push(RenderedLine {
                html: line::render_raw(raw),
                raw: true,
                fence: false,
                in_block: false,
            });
        } else {
            lines.push(RenderedLine {
                html: render_line(raw, &mut links),
                raw: false,
                fence: line::is_fence(raw),
                in_block: false,
            });
        }
    }

    mark_fenced_blocks(&mut lines);

    let mut out = String::new();
    for l in &lines {
        let mut classes = String::from("line");
        if l.raw {
            classes.push_str(" raw-line");
        }
        if l.in_block {
            classes.push_str(" in-code-block");
        }
        out.push_str(&format!("<div class=\"{}\">{}</div>", classes, l.html));
    }
    out
}

#[derive(Debug)]
struct RenderedLine {
    html: String,
    raw: bool,
    fence: bool,
    in_block: bool,
}

/// Pairs fence-marker lines (1st+2nd, 3rd+4th, …) and tags the lines
/// strictly between each pair so the host can shade fenced blocks. An
/// unterminated trailing fence pairs with nothing.
fn mark_fenced_blocks(lines: &mut [RenderedLine]) {
    let fences: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| l.fence)
        .map(|(i, _)| i)
        .collect();

    for pair in fences.chunks(2) {
        if let [open, close] = *pair {
            for l in &mut lines[open + 1..close] {
                l.in_block = true;
            }
        }
    }
}
