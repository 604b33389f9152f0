//! Plain Markdown editing: a textarea showing the source directly.
//!
//! Only Enter needs help here. Everything else is native text input that the
//! host mirrors into the buffer.

use crate::actions::{KeyResult, Modifiers};
use crate::compile::compile;
use crate::content::ContentStats;
use crate::text::{EditorRope, TextBuffer};
use crate::text_helpers::{detect_list_context, find_line_end, find_line_start, is_list_item_empty};
use crate::tree::RichDocument;

/// Markdown source plus a caret, both in chars.
#[derive(Debug, Clone, Default)]
pub struct PlainEditor<T: TextBuffer = EditorRope> {
    buffer: T,
    cursor: usize,
}

impl PlainEditor<EditorRope> {
    pub fn from_markdown(markdown: &str) -> Self {
        Self::new(EditorRope::from_str(markdown))
    }
}

impl<T: TextBuffer> PlainEditor<T> {
    /// Caret starts at the end of the buffer.
    pub fn new(buffer: T) -> Self {
        let cursor = buffer.len_chars();
        Self { buffer, cursor }
    }

    pub fn buffer(&self) -> &T {
        &self.buffer
    }

    pub fn content(&self) -> String {
        self.buffer.to_string()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_cursor(&mut self, offset: usize) {
        self.cursor = offset.min(self.buffer.len_chars());
    }

    /// Insert at the caret and move past the inserted text.
    pub fn insert(&mut self, text: &str) {
        self.buffer.insert(self.cursor, text);
        self.cursor += text.chars().count();
    }

    pub fn to_document(&self) -> RichDocument {
        compile(&self.content())
    }

    pub fn stats(&self, max_length: usize) -> ContentStats {
        ContentStats::measure(&self.to_document(), max_length)
    }

    /// Enter in a list item line.
    ///
    /// Continues the list with the next marker, or, on an item with nothing
    /// after its marker, removes the marker and leaves an empty line. Outside
    /// a list, before the marker, or with any modifier held the key passes
    /// through to the textarea.
    pub fn handle_enter(&mut self, modifiers: Modifiers) -> KeyResult {
        if modifiers.shift || modifiers.primary() {
            return KeyResult::PassThrough;
        }
        let Some(ctx) = detect_list_context(&self.buffer, self.cursor) else {
            return KeyResult::PassThrough;
        };
        let line_start = find_line_start(&self.buffer, self.cursor);
        let marker_end = line_start + ctx.marker().chars().count();
        if self.cursor < marker_end {
            return KeyResult::PassThrough;
        }

        if is_list_item_empty(&self.buffer, self.cursor, &ctx) {
            let line_end = find_line_end(&self.buffer, self.cursor);
            self.buffer.delete(line_start..line_end);
            self.cursor = line_start;
            tracing::debug!("removed empty list marker");
        } else {
            self.insert(&format!("\n{}", ctx.next_marker()));
        }
        KeyResult::Handled
    }
}
