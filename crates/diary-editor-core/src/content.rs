//! Text length and emptiness checks over the rich tree.

use crate::tree::{RichDocument, RichNode};

/// Entries longer than this are flagged to the user. Advisory only.
pub const MAX_CONTENT_LENGTH: usize = 10_000;

/// Number of characters (Unicode scalar values) of visible text.
///
/// Markup, list markers and line breaks do not count.
pub fn text_length(document: &RichDocument) -> usize {
    document.nodes.iter().map(node_length).sum()
}

fn node_length(node: &RichNode) -> usize {
    match node {
        RichNode::Text(t) => t.chars().count(),
        RichNode::LineBreak => 0,
        other => other.children().iter().map(node_length).sum(),
    }
}

/// True when the document shows nothing: no visible text and no list.
///
/// An empty paragraph or one holding only a line break is empty; an empty
/// list item is not, because it still renders its marker.
pub fn is_structurally_empty(document: &RichDocument) -> bool {
    !document.nodes.iter().any(RichNode::is_list) && document.text_content().trim().is_empty()
}

/// Derived figures recomputed on every committed change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentStats {
    pub chars: usize,
    pub structurally_empty: bool,
    pub over_limit: bool,
}

impl ContentStats {
    pub fn measure(document: &RichDocument, max_length: usize) -> Self {
        let chars = text_length(document);
        Self {
            chars,
            structurally_empty: is_structurally_empty(document),
            over_limit: chars > max_length,
        }
    }
}
