//! Core editing types: positions, ranges, formats and line kinds.
//!
//! Positions are expressed in editable lines rather than flat offsets. Each
//! paragraph and each list item is one line; `offset` counts chars within it,
//! with a soft break counting as one char.

/// A caret position in the rich surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextPosition {
    /// Index into the flattened sequence of editable lines.
    pub line: usize,
    /// Character offset within the line (NOT bytes, NOT UTF-16).
    pub offset: usize,
}

impl TextPosition {
    pub fn new(line: usize, offset: usize) -> Self {
        Self { line, offset }
    }
}

/// Text selection with anchor and head positions.
///
/// The anchor is where the selection started, the head is where the cursor is now.
/// They may be in any order - use `start()` and `end()` for ordered bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextRange {
    pub anchor: TextPosition,
    pub head: TextPosition,
}

impl TextRange {
    pub fn new(anchor: TextPosition, head: TextPosition) -> Self {
        Self { anchor, head }
    }

    /// Collapsed selection (cursor only).
    pub fn caret(position: TextPosition) -> Self {
        Self {
            anchor: position,
            head: position,
        }
    }

    /// A range within a single line.
    pub fn in_line(line: usize, start: usize, end: usize) -> Self {
        Self::new(TextPosition::new(line, start), TextPosition::new(line, end))
    }

    pub fn start(&self) -> TextPosition {
        self.anchor.min(self.head)
    }

    pub fn end(&self) -> TextPosition {
        self.anchor.max(self.head)
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }

    /// Check if the selection is backwards (head before anchor).
    pub fn is_backwards(&self) -> bool {
        self.head < self.anchor
    }
}

/// Inline formats the rich tree can express.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InlineFormat {
    Bold,
    Italic,
}

impl InlineFormat {
    /// The Markdown delimiter for this format.
    pub fn marker(self) -> &'static str {
        match self {
            Self::Bold => "**",
            Self::Italic => "*",
        }
    }
}

/// What kind of block an editable line belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LineKind {
    #[default]
    Paragraph,
    Bullet,
    Numbered,
}

impl LineKind {
    pub fn is_list(self) -> bool {
        !matches!(self, Self::Paragraph)
    }
}

/// Snapshot of one editable line as the surface sees it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineInfo {
    pub kind: LineKind,
    /// Plain text of the line; a soft break reads as `'\n'`.
    pub text: String,
}

impl LineInfo {
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Nothing visible: empty, whitespace, or only soft breaks.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// IME composition state of a session.
///
/// While composing, the surface owns a run of uncommitted characters and the
/// session must not read, rewrite or report the document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CompositionState {
    #[default]
    Idle,
    Composing,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_bounds() {
        let a = TextPosition::new(1, 4);
        let b = TextPosition::new(0, 9);

        let range = TextRange::new(a, b);
        assert_eq!(range.start(), b);
        assert_eq!(range.end(), a);
        assert!(range.is_backwards());
        assert!(!range.is_collapsed());
    }

    #[test]
    fn test_positions_order_by_line_first() {
        assert!(TextPosition::new(0, 100) < TextPosition::new(1, 0));
        assert!(TextPosition::new(2, 1) < TextPosition::new(2, 3));
    }

    #[test]
    fn test_caret() {
        let caret = TextRange::caret(TextPosition::new(3, 2));
        assert!(caret.is_collapsed());
        assert_eq!(caret.start(), caret.end());
    }

    #[test]
    fn test_line_info_blank() {
        let line = LineInfo {
            kind: LineKind::Bullet,
            text: " \n".to_string(),
        };
        assert!(line.is_blank());
        assert!(!line.is_empty());
        assert_eq!(line.len(), 2);
    }
}
