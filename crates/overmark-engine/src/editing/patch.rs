use serde::{Deserialize, Serialize};

/// Result of applying a formatting command.
///
/// The engine never mutates the buffer; the host commits `text` (through an
/// undo-integrated insertion primitive where available) and then restores
/// `selection`. Committing the text without restoring the selection breaks
/// the caret-stability contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditPatch {
    pub text: String,
    pub selection: std::ops::Range<usize>,
}
