//! Rich tree: the in-memory form of a diary entry while it is being edited.
//!
//! Only the node kinds below exist. Anything else coming out of a browser
//! surface is removed by the sanitizer or flattened by [`RichDocument::normalized`]
//! before it reaches this model.

/// A node in the rich tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RichNode {
    Paragraph(Vec<RichNode>),
    UnorderedList(Vec<RichNode>),
    OrderedList(Vec<RichNode>),
    ListItem(Vec<RichNode>),
    Bold(Vec<RichNode>),
    Italic(Vec<RichNode>),
    /// Literal text. Never escaped in the tree; escaping happens on HTML output.
    Text(String),
    /// Soft break inside a paragraph or list item.
    LineBreak,
}

impl RichNode {
    /// Convenience constructor for a text node.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Paragraph, list, or list item.
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            Self::Paragraph(_) | Self::UnorderedList(_) | Self::OrderedList(_) | Self::ListItem(_)
        )
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::UnorderedList(_) | Self::OrderedList(_))
    }

    /// Child nodes, empty for leaves.
    pub fn children(&self) -> &[RichNode] {
        match self {
            Self::Paragraph(c)
            | Self::UnorderedList(c)
            | Self::OrderedList(c)
            | Self::ListItem(c)
            | Self::Bold(c)
            | Self::Italic(c) => c,
            Self::Text(_) | Self::LineBreak => &[],
        }
    }

    /// Concatenated text of this node and its descendants.
    ///
    /// Line breaks contribute nothing, matching the DOM's `textContent`.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.push_text_content(&mut out);
        out
    }

    fn push_text_content(&self, out: &mut String) {
        match self {
            Self::Text(t) => out.push_str(t),
            Self::LineBreak => {}
            other => {
                for child in other.children() {
                    child.push_text_content(out);
                }
            }
        }
    }
}

/// A whole document: the top-level sequence of blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RichDocument {
    pub nodes: Vec<RichNode>,
}

impl RichDocument {
    pub fn new(nodes: Vec<RichNode>) -> Self {
        Self { nodes }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Concatenated text content of every node.
    pub fn text_content(&self) -> String {
        self.nodes.iter().map(RichNode::text_content).collect()
    }

    /// Return a copy that satisfies the structural invariants.
    ///
    /// - the top level holds only paragraphs and lists
    /// - lists hold only list items; nested lists are flattened into their parent
    /// - paragraphs, items and emphasis hold only inline nodes
    /// - stray top-level inline runs are wrapped in a paragraph; a run made only
    ///   of line breaks becomes one empty paragraph per break
    /// - empty emphasis is dropped and adjacent text merges
    pub fn normalized(&self) -> Self {
        let mut blocks = Vec::new();
        let mut pending: Vec<RichNode> = Vec::new();

        for node in &self.nodes {
            match node {
                RichNode::Paragraph(children) => {
                    flush_inline_run(&mut pending, &mut blocks);
                    push_paragraph_blocks(children, &mut blocks);
                }
                RichNode::UnorderedList(_) | RichNode::OrderedList(_) => {
                    flush_inline_run(&mut pending, &mut blocks);
                    blocks.push(normalize_list(node));
                }
                RichNode::ListItem(children) => {
                    // An item without a list around it is still a visible bullet.
                    flush_inline_run(&mut pending, &mut blocks);
                    blocks.push(RichNode::UnorderedList(vec![RichNode::ListItem(
                        normalize_inlines(children),
                    )]));
                }
                inline => pending.push(inline.clone()),
            }
        }
        flush_inline_run(&mut pending, &mut blocks);

        Self { nodes: blocks }
    }
}

fn flush_inline_run(pending: &mut Vec<RichNode>, blocks: &mut Vec<RichNode>) {
    if pending.is_empty() {
        return;
    }
    let run = std::mem::take(pending);
    if is_blank_run(&run) {
        // Formatting whitespace between block tags.
        return;
    }
    if run.iter().all(|n| matches!(n, RichNode::LineBreak)) {
        blocks.extend(run.iter().map(|_| RichNode::Paragraph(Vec::new())));
        return;
    }
    blocks.push(RichNode::Paragraph(normalize_inlines(&run)));
}

/// A paragraph may hold lists when it came from a browser surface; split it
/// around them so that lists stay top level.
fn push_paragraph_blocks(children: &[RichNode], blocks: &mut Vec<RichNode>) {
    if !children.iter().any(RichNode::is_list) {
        blocks.push(RichNode::Paragraph(normalize_inlines(children)));
        return;
    }
    let mut run = Vec::new();
    for child in children {
        if child.is_list() {
            if !run.is_empty() {
                blocks.push(RichNode::Paragraph(normalize_inlines(&run)));
                run.clear();
            }
            blocks.push(normalize_list(child));
        } else {
            run.push(child.clone());
        }
    }
    if !run.is_empty() {
        blocks.push(RichNode::Paragraph(normalize_inlines(&run)));
    }
}

fn normalize_list(list: &RichNode) -> RichNode {
    let mut items = Vec::new();
    collect_items(list.children(), &mut items);
    match list {
        RichNode::OrderedList(_) => RichNode::OrderedList(items),
        _ => RichNode::UnorderedList(items),
    }
}

fn collect_items(children: &[RichNode], items: &mut Vec<RichNode>) {
    let mut stray = Vec::new();
    for child in children {
        match child {
            RichNode::ListItem(content) => {
                flush_stray(&mut stray, items);
                let (inline, nested): (Vec<_>, Vec<_>) =
                    content.iter().cloned().partition(|n| !n.is_list());
                items.push(RichNode::ListItem(normalize_inlines(&inline)));
                for list in nested {
                    collect_items(list.children(), items);
                }
            }
            RichNode::UnorderedList(inner) | RichNode::OrderedList(inner) => {
                flush_stray(&mut stray, items);
                collect_items(inner, items);
            }
            other => stray.push(other.clone()),
        }
    }
    flush_stray(&mut stray, items);
}

fn flush_stray(stray: &mut Vec<RichNode>, items: &mut Vec<RichNode>) {
    if stray.is_empty() {
        return;
    }
    let run = std::mem::take(stray);
    if is_blank_run(&run) {
        return;
    }
    let content = normalize_inlines(&run);
    if !content.is_empty() {
        items.push(RichNode::ListItem(content));
    }
}

fn is_blank_run(run: &[RichNode]) -> bool {
    run.iter()
        .all(|n| matches!(n, RichNode::Text(t) if t.trim().is_empty()))
}

/// Flatten arbitrary content to a clean inline sequence.
pub(crate) fn normalize_inlines(nodes: &[RichNode]) -> Vec<RichNode> {
    let mut out = Vec::new();
    for node in nodes {
        match node {
            RichNode::Text(t) => {
                if t.is_empty() {
                    continue;
                }
                if let Some(RichNode::Text(prev)) = out.last_mut() {
                    prev.push_str(t);
                } else {
                    out.push(RichNode::Text(t.clone()));
                }
            }
            RichNode::LineBreak => out.push(RichNode::LineBreak),
            RichNode::Bold(children) => {
                let inner = normalize_inlines(children);
                if !inner.is_empty() {
                    out.push(RichNode::Bold(inner));
                }
            }
            RichNode::Italic(children) => {
                let inner = normalize_inlines(children);
                match inner.as_slice() {
                    [] => {}
                    // `***x***` reads back bold outside, so that nesting is canonical.
                    [RichNode::Bold(bold)] => {
                        out.push(RichNode::Bold(vec![RichNode::Italic(bold.clone())]))
                    }
                    _ => out.push(RichNode::Italic(inner)),
                }
            }
            block => {
                // Block content inside an inline context is joined with soft breaks.
                let inner = match block {
                    RichNode::UnorderedList(items) | RichNode::OrderedList(items) => {
                        let mut joined = Vec::new();
                        for (i, item) in items.iter().enumerate() {
                            if i > 0 {
                                joined.push(RichNode::LineBreak);
                            }
                            joined.extend(item.children().iter().cloned());
                        }
                        normalize_inlines(&joined)
                    }
                    other => normalize_inlines(other.children()),
                };
                if inner.is_empty() {
                    continue;
                }
                if !out.is_empty() && !matches!(out.last(), Some(RichNode::LineBreak)) {
                    out.push(RichNode::LineBreak);
                }
                for n in inner {
                    match (out.last_mut(), n) {
                        (Some(RichNode::Text(prev)), RichNode::Text(t)) => prev.push_str(&t),
                        (_, n) => out.push(n),
                    }
                }
            }
        }
    }
    out
}
