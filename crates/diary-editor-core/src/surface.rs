//! Headless editing surface.
//!
//! An in-memory line model that behaves like a contenteditable element for
//! everything the session asks of it. Non-browser hosts and the test suite
//! drive the session through this.

use crate::platform::{EditingSurface, PlatformError};
use crate::serialize::trim_trailing_breaks;
use crate::tree::{RichDocument, RichNode};
use crate::types::{InlineFormat, LineInfo, LineKind, TextPosition, TextRange};

/// One character with its inline formatting. A soft break is `'\n'`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyledChar {
    pub ch: char,
    pub bold: bool,
    pub italic: bool,
}

impl StyledChar {
    fn plain(ch: char) -> Self {
        Self {
            ch,
            bold: false,
            italic: false,
        }
    }

    fn has(&self, format: InlineFormat) -> bool {
        match format {
            InlineFormat::Bold => self.bold,
            InlineFormat::Italic => self.italic,
        }
    }

    fn set(&mut self, format: InlineFormat, on: bool) {
        match format {
            InlineFormat::Bold => self.bold = on,
            InlineFormat::Italic => self.italic = on,
        }
    }
}

/// One paragraph or list item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    pub kind: LineKind,
    pub chars: Vec<StyledChar>,
}

impl Line {
    fn text(&self) -> String {
        self.chars.iter().map(|c| c.ch).collect()
    }

    /// Style a char typed at `offset` picks up: the one before it, else the one after.
    fn style_at(&self, offset: usize) -> StyledChar {
        offset
            .checked_sub(1)
            .and_then(|i| self.chars.get(i))
            .or_else(|| self.chars.get(offset))
            .copied()
            .unwrap_or(StyledChar::plain(' '))
    }

    fn inlines(&self) -> Vec<RichNode> {
        let mut out = Vec::new();
        let mut i = 0;
        while i < self.chars.len() {
            let bold = self.chars[i].bold;
            let run_end = run_end(&self.chars, i, |c| c.bold == bold);
            let inner = italic_runs(&self.chars[i..run_end]);
            if bold {
                out.push(RichNode::Bold(inner));
            } else {
                out.extend(inner);
            }
            i = run_end;
        }
        out
    }
}

fn run_end(chars: &[StyledChar], from: usize, same: impl Fn(&StyledChar) -> bool) -> usize {
    chars[from..]
        .iter()
        .position(|c| !same(c))
        .map_or(chars.len(), |p| from + p)
}

fn italic_runs(chars: &[StyledChar]) -> Vec<RichNode> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let italic = chars[i].italic;
        let end = run_end(chars, i, |c| c.italic == italic);
        let plain = plain_nodes(&chars[i..end]);
        if italic {
            out.push(RichNode::Italic(plain));
        } else {
            out.extend(plain);
        }
        i = end;
    }
    out
}

fn plain_nodes(chars: &[StyledChar]) -> Vec<RichNode> {
    let mut out = Vec::new();
    let mut text = String::new();
    for c in chars {
        if c.ch == '\n' {
            if !text.is_empty() {
                out.push(RichNode::Text(std::mem::take(&mut text)));
            }
            out.push(RichNode::LineBreak);
        } else {
            text.push(c.ch);
        }
    }
    if !text.is_empty() {
        out.push(RichNode::Text(text));
    }
    out
}

fn push_styled(nodes: &[RichNode], bold: bool, italic: bool, out: &mut Vec<StyledChar>) {
    for node in nodes {
        match node {
            RichNode::Text(t) => out.extend(t.chars().map(|ch| StyledChar { ch, bold, italic })),
            RichNode::LineBreak => out.push(StyledChar {
                ch: '\n',
                bold,
                italic,
            }),
            RichNode::Bold(children) => push_styled(children, true, italic, out),
            RichNode::Italic(children) => push_styled(children, bold, true, out),
            other => push_styled(other.children(), bold, italic, out),
        }
    }
}

/// In-memory [`EditingSurface`].
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    lines: Vec<Line>,
    selection: Option<TextRange>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_document(document: &RichDocument) -> Self {
        let mut surface = Self::new();
        surface.load(document);
        surface
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Drop the selection, as when the editor loses focus.
    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Caret position at the very end of the content.
    pub fn end_position(&self) -> TextPosition {
        match self.lines.len().checked_sub(1) {
            Some(last) => TextPosition::new(last, self.lines[last].chars.len()),
            None => TextPosition::default(),
        }
    }

    /// Type `text` over the current selection, like a keyboard would.
    ///
    /// Returns `Ok(false)` when there is no selection to type into.
    pub fn type_text(&mut self, text: &str) -> Result<bool, PlatformError> {
        let Some(range) = self.selection else {
            return Ok(false);
        };
        self.replace_range(range, text)?;
        Ok(true)
    }

    fn load(&mut self, document: &RichDocument) {
        self.lines.clear();
        for node in document.normalized().nodes {
            match &node {
                RichNode::Paragraph(children) => self.push_line(LineKind::Paragraph, children),
                RichNode::UnorderedList(items) => {
                    for item in items {
                        self.push_line(LineKind::Bullet, item.children());
                    }
                }
                RichNode::OrderedList(items) => {
                    for item in items {
                        self.push_line(LineKind::Numbered, item.children());
                    }
                }
                _ => {}
            }
        }
    }

    fn push_line(&mut self, kind: LineKind, children: &[RichNode]) {
        let mut chars = Vec::new();
        push_styled(trim_trailing_breaks(children), false, false, &mut chars);
        self.lines.push(Line { kind, chars });
    }

    fn check(&self, pos: TextPosition) -> Result<(), PlatformError> {
        let line = self
            .lines
            .get(pos.line)
            .ok_or(PlatformError::NoSuchLine(pos.line))?;
        if pos.offset > line.chars.len() {
            return Err(PlatformError::OutOfRange {
                line: pos.line,
                offset: pos.offset,
            });
        }
        Ok(())
    }

    /// An empty surface still has one empty paragraph to put a caret in.
    fn ensure_line(&mut self) {
        if self.lines.is_empty() {
            self.lines.push(Line::default());
        }
    }

    fn delete_range(&mut self, start: TextPosition, end: TextPosition) {
        if start.line == end.line {
            self.lines[start.line].chars.drain(start.offset..end.offset);
            return;
        }
        let tail = self.lines[end.line].chars.split_off(end.offset);
        self.lines[start.line].chars.truncate(start.offset);
        self.lines[start.line].chars.extend(tail);
        self.lines.drain(start.line + 1..=end.line);
    }

    fn split_at(&mut self, at: TextPosition) -> TextPosition {
        let line = &mut self.lines[at.line];
        let rest = line.chars.split_off(at.offset);
        let kind = line.kind;
        self.lines.insert(at.line + 1, Line { kind, chars: rest });
        TextPosition::new(at.line + 1, 0)
    }

    fn collapse_to(&mut self, pos: TextPosition) -> TextPosition {
        self.selection = Some(TextRange::caret(pos));
        pos
    }
}

impl EditingSurface for MemorySurface {
    fn selection(&self) -> Option<TextRange> {
        self.selection
    }

    fn set_selection(&mut self, range: TextRange) -> Result<(), PlatformError> {
        self.ensure_line();
        self.check(range.anchor)?;
        self.check(range.head)?;
        self.selection = Some(range);
        Ok(())
    }

    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line(&self, index: usize) -> Option<LineInfo> {
        self.lines.get(index).map(|line| LineInfo {
            kind: line.kind,
            text: line.text(),
        })
    }

    fn replace_range(
        &mut self,
        range: TextRange,
        text: &str,
    ) -> Result<TextPosition, PlatformError> {
        self.ensure_line();
        let (start, end) = (range.start(), range.end());
        self.check(start)?;
        self.check(end)?;
        self.delete_range(start, end);

        let style = self.lines[start.line].style_at(start.offset);
        let mut pos = start;
        for (i, segment) in text.split('\n').enumerate() {
            if i > 0 {
                pos = self.split_at(pos);
            }
            let line = &mut self.lines[pos.line];
            let styled = segment.chars().map(|ch| StyledChar { ch, ..style });
            let count = segment.chars().count();
            line.chars.splice(pos.offset..pos.offset, styled);
            pos.offset += count;
        }
        Ok(self.collapse_to(pos))
    }

    fn apply_inline_format(
        &mut self,
        range: TextRange,
        format: InlineFormat,
    ) -> Result<bool, PlatformError> {
        if range.is_collapsed() {
            return Ok(false);
        }
        let (start, end) = (range.start(), range.end());
        self.check(start)?;
        self.check(end)?;

        let mut targets = Vec::new();
        for line in start.line..=end.line {
            let from = if line == start.line { start.offset } else { 0 };
            let to = if line == end.line {
                end.offset
            } else {
                self.lines[line].chars.len()
            };
            targets.push((line, from, to));
        }

        let mut selected = targets
            .iter()
            .flat_map(|&(line, from, to)| self.lines[line].chars[from..to].iter());
        let Some(first) = selected.next() else {
            return Ok(false);
        };
        let already = first.has(format) && selected.all(|c| c.has(format));

        for (line, from, to) in targets {
            for c in &mut self.lines[line].chars[from..to] {
                c.set(format, !already);
            }
        }
        self.selection = Some(range);
        Ok(true)
    }

    fn split_line(&mut self, at: TextPosition) -> Result<TextPosition, PlatformError> {
        self.ensure_line();
        self.check(at)?;
        let pos = self.split_at(at);
        Ok(self.collapse_to(pos))
    }

    fn insert_line_break(&mut self, at: TextPosition) -> Result<TextPosition, PlatformError> {
        self.ensure_line();
        self.check(at)?;
        let line = &mut self.lines[at.line];
        let style = line.style_at(at.offset);
        line.chars.insert(at.offset, StyledChar { ch: '\n', ..style });
        Ok(self.collapse_to(TextPosition::new(at.line, at.offset + 1)))
    }

    fn set_line_kind(&mut self, line: usize, kind: LineKind) -> Result<(), PlatformError> {
        let target = self
            .lines
            .get_mut(line)
            .ok_or(PlatformError::NoSuchLine(line))?;
        target.kind = kind;
        Ok(())
    }

    fn read_document(&self) -> RichDocument {
        let mut nodes = Vec::new();
        let mut i = 0;
        while i < self.lines.len() {
            let kind = self.lines[i].kind;
            if kind == LineKind::Paragraph {
                nodes.push(RichNode::Paragraph(self.lines[i].inlines()));
                i += 1;
                continue;
            }
            let mut items = Vec::new();
            while i < self.lines.len() && self.lines[i].kind == kind {
                items.push(RichNode::ListItem(self.lines[i].inlines()));
                i += 1;
            }
            nodes.push(match kind {
                LineKind::Numbered => RichNode::OrderedList(items),
                _ => RichNode::UnorderedList(items),
            });
        }
        RichDocument::new(nodes).normalized()
    }

    fn render(&mut self, document: &RichDocument) -> Result<(), PlatformError> {
        self.load(document);
        self.selection = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::compile;
    use crate::serialize::serialize;

    fn surface(markdown: &str) -> MemorySurface {
        MemorySurface::from_document(&compile(markdown))
    }

    fn markdown(surface: &MemorySurface) -> String {
        serialize(&surface.read_document())
    }

    #[test]
    fn test_load_and_read_back() {
        let md = "Hello **world** and *more*\n\n- a\n- b\n\n1. x\n2. y\n\n\nEnd";
        let s = surface(md);
        assert_eq!(s.line_count(), 7);
        assert_eq!(s.line(1).map(|l| l.kind), Some(LineKind::Bullet));
        assert_eq!(markdown(&s), md);
    }

    #[test]
    fn test_typing_inherits_style() {
        let mut s = surface("a **bold**");
        let end = s.end_position();
        s.replace_range(TextRange::caret(end), "er").unwrap();
        assert_eq!(markdown(&s), "a **bolder**");
    }

    #[test]
    fn test_replace_across_lines() {
        let mut s = surface("first\n\nsecond");
        let range = TextRange::new(TextPosition::new(0, 2), TextPosition::new(1, 3));
        let caret = s.replace_range(range, "-").unwrap();
        assert_eq!(caret, TextPosition::new(0, 3));
        assert_eq!(markdown(&s), "fi-ond");
    }

    #[test]
    fn test_newline_in_inserted_text_splits_line() {
        let mut s = surface("- one");
        let caret = s
            .replace_range(TextRange::caret(s.end_position()), "\ntwo")
            .unwrap();
        assert_eq!(caret, TextPosition::new(1, 3));
        assert_eq!(markdown(&s), "- one\n- two");
    }

    #[test]
    fn test_format_toggles() {
        let mut s = surface("hello world");
        let range = TextRange::in_line(0, 6, 11);
        assert!(s.apply_inline_format(range, InlineFormat::Bold).unwrap());
        assert_eq!(markdown(&s), "hello **world**");
        assert!(s.apply_inline_format(range, InlineFormat::Bold).unwrap());
        assert_eq!(markdown(&s), "hello world");
        assert!(!s
            .apply_inline_format(TextRange::in_line(0, 2, 2), InlineFormat::Italic)
            .unwrap());
    }

    #[test]
    fn test_soft_break() {
        let mut s = surface("ab");
        s.insert_line_break(TextPosition::new(0, 1)).unwrap();
        assert_eq!(s.line(0).map(|l| l.text), Some("a\nb".to_string()));
        assert_eq!(markdown(&s), "a\nb");
    }

    #[test]
    fn test_split_and_kind() {
        let mut s = surface("- ab");
        let caret = s.split_line(TextPosition::new(0, 1)).unwrap();
        assert_eq!(caret, TextPosition::new(1, 0));
        assert_eq!(markdown(&s), "- a\n- b");
        s.set_line_kind(1, LineKind::Paragraph).unwrap();
        assert_eq!(markdown(&s), "- a\n\nb");
        assert_eq!(
            s.set_line_kind(9, LineKind::Bullet),
            Err(PlatformError::NoSuchLine(9))
        );
    }

    #[test]
    fn test_out_of_range() {
        let mut s = surface("abc");
        let err = s
            .set_selection(TextRange::caret(TextPosition::new(0, 4)))
            .unwrap_err();
        assert_eq!(err, PlatformError::OutOfRange { line: 0, offset: 4 });
    }

    #[test]
    fn test_empty_surface_gets_a_line() {
        let mut s = MemorySurface::new();
        s.set_selection(TextRange::caret(TextPosition::default()))
            .unwrap();
        assert!(s.type_text("hi").unwrap());
        assert_eq!(markdown(&s), "hi");
    }
}
