//! Markdown to rich tree compiler.
//!
//! Line oriented. State is the kind of list currently open and whether the
//! previous line was blank. The first blank line after a block is a silent
//! separator; every further blank line in the same run becomes a visible
//! empty paragraph.

use crate::inline::scan_inline;
use crate::tree::{RichDocument, RichNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Unordered,
    Ordered,
}

/// How a single non-blank line is treated.
#[derive(Debug, PartialEq, Eq)]
enum LineClass<'a> {
    Unordered(&'a str),
    Ordered(&'a str),
    Paragraph(&'a str),
}

fn classify(line: &str) -> LineClass<'_> {
    if let Some(content) = line.strip_prefix("- ") {
        if !content.trim().is_empty() {
            return LineClass::Unordered(content);
        }
    }
    if let Some(content) = ordered_item_content(line) {
        return LineClass::Ordered(content);
    }
    LineClass::Paragraph(line)
}

/// Content of a `^\d+\. ` line, or `None` if the line is not an ordered item.
///
/// A marker whose number does not parse falls back to a plain paragraph.
fn ordered_item_content(line: &str) -> Option<&str> {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let content = line[digits..].strip_prefix(". ")?;
    if line[..digits].parse::<u64>().is_err() {
        tracing::debug!(marker = &line[..digits], "unparseable list number, keeping as paragraph");
        return None;
    }
    Some(content)
}

struct Compiler {
    nodes: Vec<RichNode>,
    list: Option<(ListKind, Vec<RichNode>)>,
    after_blank: bool,
}

impl Compiler {
    fn new() -> Self {
        Self {
            nodes: Vec::new(),
            list: None,
            after_blank: false,
        }
    }

    fn close_list(&mut self) {
        if let Some((kind, items)) = self.list.take() {
            self.nodes.push(match kind {
                ListKind::Unordered => RichNode::UnorderedList(items),
                ListKind::Ordered => RichNode::OrderedList(items),
            });
        }
    }

    fn push_item(&mut self, kind: ListKind, content: &str) {
        if self.list.as_ref().is_some_and(|(open, _)| *open != kind) {
            self.close_list();
        }
        let item = RichNode::ListItem(scan_inline(content));
        match &mut self.list {
            Some((_, items)) => items.push(item),
            None => self.list = Some((kind, vec![item])),
        }
    }

    fn line(&mut self, line: &str) {
        if line.trim().is_empty() {
            self.close_list();
            if self.after_blank {
                self.nodes.push(RichNode::Paragraph(Vec::new()));
            }
            self.after_blank = true;
            return;
        }
        self.after_blank = false;

        match classify(line) {
            LineClass::Unordered(content) => self.push_item(ListKind::Unordered, content),
            LineClass::Ordered(content) => self.push_item(ListKind::Ordered, content),
            LineClass::Paragraph(text) => {
                self.close_list();
                self.nodes.push(RichNode::Paragraph(scan_inline(text)));
            }
        }
    }

    fn finish(mut self) -> RichDocument {
        self.close_list();
        RichDocument::new(self.nodes)
    }
}

/// Compile diary Markdown into a rich tree.
pub fn compile(markdown: &str) -> RichDocument {
    let mut compiler = Compiler::new();
    for raw in markdown.split('\n') {
        compiler.line(raw.strip_suffix('\r').unwrap_or(raw));
    }
    compiler.finish()
}
