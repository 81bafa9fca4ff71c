//! Core engine for overmark: a monospace markdown overlay editor.
//!
//! The editor keeps two font-matched layers in perfect visual alignment: a
//! plain `<textarea>`-style input surface holding the raw markdown, and a
//! styled preview surface rendered from it. Because the layers never need
//! offset translation, the cursor lives only in the raw layer and all
//! positions in this crate are byte offsets into the raw buffer.
//!
//! Two subsystems form the core:
//!
//! - [`render`]: the line renderer. Maps each raw text line to one markup
//!   line, with a document pass that can show the active line as raw text.
//!   Rendering is total: any input, including half-typed markdown, produces
//!   deterministic markup.
//! - [`editing`]: the selection-preserving edit engine. Formatting commands
//!   ([`FormatCmd`]) are pure functions over `(buffer, selection)` returning
//!   an [`EditPatch`] with the replacement text and the new selection. The
//!   host commits the text and restores the selection; the engine never
//!   mutates anything itself.

pub mod editing;
pub mod render;

// Re-export key types for easier usage
pub use editing::{
    ActiveFormats, EditPatch, FormatCmd, FormatError, HeaderLevel, active_formats, apply_format,
};
pub use render::{LinkCounter, render_document, render_line};
