//! Platform abstraction for the rich editing surface.
//!
//! The session never touches a DOM, selection object or formatting command
//! directly. It goes through [`EditingSurface`], which the browser crate
//! implements over `contenteditable` and [`crate::surface::MemorySurface`]
//! implements headlessly.

use crate::tree::RichDocument;
use crate::types::{InlineFormat, LineInfo, LineKind, TextPosition, TextRange};

/// Error type for platform operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
    #[error("no such line: {0}")]
    NoSuchLine(usize),
    #[error("position {line}:{offset} is outside the document")]
    OutOfRange { line: usize, offset: usize },
    #[error("platform call failed: {0}")]
    Platform(String),
}

impl From<&str> for PlatformError {
    fn from(s: &str) -> Self {
        PlatformError::Platform(s.to_string())
    }
}

impl From<String> for PlatformError {
    fn from(s: String) -> Self {
        PlatformError::Platform(s)
    }
}

/// Paste payload as delivered by the platform clipboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipboardData {
    pub plain: Option<String>,
    /// Never inserted. Kept so adapters can log what was discarded.
    pub html: Option<String>,
}

impl ClipboardData {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            plain: Some(text.into()),
            html: None,
        }
    }
}

/// A rich-text editing surface.
///
/// Operations that need a live selection return `Ok(false)` or `None` when the
/// platform has none, so a headless or unfocused editor stays usable.
pub trait EditingSurface {
    /// Current selection, or `None` when the surface has no selection.
    fn selection(&self) -> Option<TextRange>;

    fn set_selection(&mut self, range: TextRange) -> Result<(), PlatformError>;

    /// Number of editable lines (paragraphs and list items).
    fn line_count(&self) -> usize;

    fn line(&self, index: usize) -> Option<LineInfo>;

    /// Replace `range` with plain `text`, returning the caret after the insert.
    ///
    /// A `'\n'` in `text` starts a new line of the same kind.
    fn replace_range(&mut self, range: TextRange, text: &str)
    -> Result<TextPosition, PlatformError>;

    /// Apply (or remove, when already fully applied) an inline format.
    ///
    /// Returns `Ok(false)` when there was nothing to format.
    fn apply_inline_format(
        &mut self,
        range: TextRange,
        format: InlineFormat,
    ) -> Result<bool, PlatformError>;

    /// Split the line at the caret into two lines of the same kind.
    fn split_line(&mut self, at: TextPosition) -> Result<TextPosition, PlatformError>;

    /// Insert a soft break at the caret.
    fn insert_line_break(&mut self, at: TextPosition) -> Result<TextPosition, PlatformError>;

    fn set_line_kind(&mut self, line: usize, kind: LineKind) -> Result<(), PlatformError>;

    /// Read the surface content as a normalized rich tree.
    fn read_document(&self) -> RichDocument;

    /// Replace the whole surface content.
    fn render(&mut self, document: &RichDocument) -> Result<(), PlatformError>;
}
