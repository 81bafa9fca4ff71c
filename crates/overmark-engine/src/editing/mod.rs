//! Selection-preserving edit engine.
//!
//! Formatting commands rewrite the raw buffer while keeping the caret or
//! selection semantically stable. The engine is a set of pure functions: it
//! reads `(buffer, selection)` and proposes an [`EditPatch`] with the full
//! replacement text and the new selection, which the host commits through
//! its own (preferably undo-integrated) insertion primitive. Commands must
//! be dispatched sequentially; a patch has to be applied before the next
//! command is issued.
//!
//! Toggle semantics: applying the same command to its own output restores
//! the affected span. Inline styles expand a collapsed caret to the
//! enclosing word; line styles snap the selection to whole lines. Bullet
//! and numbered lists convert into each other instead of stacking, and a
//! header command replaces any existing header level in one step.

pub mod active;
pub mod format;
pub mod patch;
pub mod style;

mod selection;

pub use active::{ActiveFormats, active_formats};
pub use format::apply_format;
pub use patch::EditPatch;
pub use style::{FormatCmd, FormatError, HeaderLevel};
