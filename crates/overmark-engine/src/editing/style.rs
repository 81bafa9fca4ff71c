use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("header level out of range: {0} (expected 1-6)")]
    HeaderLevel(u8),
}

/// Validated header level, 1 through 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderLevel(u8);

impl HeaderLevel {
    pub fn new(level: u8) -> Result<Self, FormatError> {
        if (1..=6).contains(&level) {
            Ok(Self(level))
        } else {
            Err(FormatError::HeaderLevel(level))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// The line prefix for this level, including the trailing space.
    pub(crate) fn prefix(self) -> &'static str {
        match self.0 {
            1 => "# ",
            2 => "## ",
            3 => "### ",
            4 => "#### ",
            5 => "##### ",
            _ => "###### ",
        }
    }
}

/// Formatting commands the host can request.
///
/// A closed enum rather than string identifiers: dispatch is exhaustive at
/// compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormatCmd {
    Bold,
    Italic,
    Code,
    Link,
    Quote,
    TaskList,
    BulletList,
    NumberedList,
    Header(HeaderLevel),
}

/// How a formatting command transforms text: an immutable template merged
/// over an all-empty baseline. One descriptor exists per command kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct FormatStyle {
    pub prefix: &'static str,
    pub suffix: &'static str,
    pub block_prefix: &'static str,
    pub block_suffix: &'static str,
    pub multiline: bool,
    pub trim_first: bool,
    pub surround_with_newlines: bool,
    pub scan_for: Option<&'static str>,
    pub replace_next: Option<&'static str>,
    pub ordered_list: bool,
    pub unordered_list: bool,
}

impl FormatCmd {
    pub(crate) fn style(&self) -> FormatStyle {
        let base = FormatStyle::default();
        match self {
            FormatCmd::Bold => FormatStyle {
                prefix: "**",
                suffix: "**",
                trim_first: true,
                ..base
            },
            FormatCmd::Italic => FormatStyle {
                prefix: "*",
                suffix: "*",
                trim_first: true,
                ..base
            },
            FormatCmd::Code => FormatStyle {
                prefix: "`",
                suffix: "`",
                block_prefix: "```",
                block_suffix: "```",
                ..base
            },
            FormatCmd::Link => FormatStyle {
                prefix: "[",
                suffix: "](url)",
                replace_next: Some("url"),
                scan_for: Some(r"^https?://\S+$"),
                ..base
            },
            FormatCmd::Quote => FormatStyle {
                prefix: "> ",
                multiline: true,
                surround_with_newlines: true,
                ..base
            },
            FormatCmd::TaskList => FormatStyle {
                prefix: "- [ ] ",
                multiline: true,
                surround_with_newlines: true,
                ..base
            },
            FormatCmd::BulletList => FormatStyle {
                prefix: "- ",
                multiline: true,
                unordered_list: true,
                ..base
            },
            FormatCmd::NumberedList => FormatStyle {
                prefix: "1. ",
                multiline: true,
                ordered_list: true,
                ..base
            },
            FormatCmd::Header(level) => FormatStyle {
                prefix: level.prefix(),
                multiline: true,
                ..base
            },
        }
    }
}
