//! Line and list helpers for plain Markdown text.

use crate::text::TextBuffer;

/// Find start of line containing offset.
pub fn find_line_start<T: TextBuffer>(buf: &T, offset: usize) -> usize {
    let mut pos = offset.min(buf.len_chars());
    while pos > 0 {
        if let Some('\n') = buf.char_at(pos - 1) {
            return pos;
        }
        pos -= 1;
    }
    0
}

/// Find end of line containing offset (position of newline or end of text).
pub fn find_line_end<T: TextBuffer>(buf: &T, offset: usize) -> usize {
    let len = buf.len_chars();
    let mut pos = offset;
    while pos < len {
        if let Some('\n') = buf.char_at(pos) {
            return pos;
        }
        pos += 1;
    }
    len
}

/// What kind of list item a line is, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListContext {
    /// `- ` item.
    Unordered,
    /// `N. ` item with its current number.
    Ordered { number: u64 },
}

impl ListContext {
    /// Marker text for this item, including the trailing space.
    pub fn marker(&self) -> String {
        match self {
            Self::Unordered => "- ".to_string(),
            Self::Ordered { number } => format!("{number}. "),
        }
    }

    /// Marker for the item that follows this one.
    pub fn next_marker(&self) -> String {
        match self {
            Self::Unordered => "- ".to_string(),
            Self::Ordered { number } => format!("{}. ", number.saturating_add(1)),
        }
    }
}

/// Classify a single line of Markdown source.
///
/// Unlike the compiler, a bare `- ` counts as a (still empty) list item here:
/// that is exactly the state the Enter key needs to recognize.
pub fn list_context_of_line(line: &str) -> Option<ListContext> {
    if line.starts_with("- ") {
        return Some(ListContext::Unordered);
    }
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || !line[digits..].starts_with(". ") {
        return None;
    }
    let number = line[..digits].parse().ok()?;
    Some(ListContext::Ordered { number })
}

/// Detect if the cursor is in a list item line.
pub fn detect_list_context<T: TextBuffer>(buf: &T, cursor_offset: usize) -> Option<ListContext> {
    let line = current_line(buf, cursor_offset)?;
    list_context_of_line(&line)
}

/// Check if the list item at the cursor has nothing after its marker.
pub fn is_list_item_empty<T: TextBuffer>(buf: &T, cursor_offset: usize, ctx: &ListContext) -> bool {
    let Some(line) = current_line(buf, cursor_offset) else {
        return false;
    };
    let marker_len = ctx.marker().len();
    line.get(marker_len..).is_some_and(|rest| rest.trim().is_empty())
}

fn current_line<T: TextBuffer>(buf: &T, offset: usize) -> Option<String> {
    let start = find_line_start(buf, offset);
    let end = find_line_end(buf, offset);
    buf.slice(start..end).map(|s| s.to_string())
}
