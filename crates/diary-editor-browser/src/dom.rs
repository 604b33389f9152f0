//! Line discovery and position mapping over the editor DOM.
//!
//! A line is a leaf block element: a `p`, `li` or `div` that holds no other
//! block. Within a line, text nodes contribute their characters and each `br`
//! contributes one `'\n'`, except a trailing `br`, which is the placeholder
//! browsers keep in empty or soft-broken blocks.

use diary_editor_core::{LineInfo, LineKind, TextPosition};
use web_sys::{Element, Node};

const LINE_SELECTOR: &str = "p, li, div";

/// One editable line in the DOM.
#[derive(Debug, Clone)]
pub struct DomLine {
    pub element: Element,
    pub kind: LineKind,
}

impl DomLine {
    pub fn info(&self) -> LineInfo {
        LineInfo {
            kind: self.kind,
            text: line_text(&self.element),
        }
    }

    pub fn len(&self) -> usize {
        line_text(&self.element).chars().count()
    }
}

#[derive(Debug)]
enum Piece {
    Text { node: Node, text: String },
    Break(Node),
}

impl Piece {
    fn len(&self) -> usize {
        match self {
            Piece::Text { text, .. } => text.chars().count(),
            Piece::Break(_) => 1,
        }
    }

    fn node(&self) -> &Node {
        match self {
            Piece::Text { node, .. } | Piece::Break(node) => node,
        }
    }
}

fn is_line_tag(name: &str) -> bool {
    ["P", "LI", "DIV"]
        .iter()
        .any(|tag| name.eq_ignore_ascii_case(tag))
}

/// All leaf line elements under `root`, in document order.
pub fn collect_lines(root: &Element) -> Vec<DomLine> {
    let mut lines = Vec::new();
    collect_lines_into(root, &mut lines);
    lines
}

fn collect_lines_into(parent: &Element, out: &mut Vec<DomLine>) {
    let children = parent.children();
    for i in 0..children.length() {
        let Some(child) = children.item(i) else {
            continue;
        };
        let tag = child.tag_name();
        let has_nested_line = matches!(child.query_selector(LINE_SELECTOR), Ok(Some(_)));
        if is_line_tag(&tag) && !has_nested_line {
            let kind = line_kind(&child, &tag);
            out.push(DomLine {
                element: child,
                kind,
            });
        } else {
            collect_lines_into(&child, out);
        }
    }
}

fn line_kind(element: &Element, tag: &str) -> LineKind {
    if !tag.eq_ignore_ascii_case("LI") {
        return LineKind::Paragraph;
    }
    match element.parent_element() {
        Some(list) if list.tag_name().eq_ignore_ascii_case("OL") => LineKind::Numbered,
        _ => LineKind::Bullet,
    }
}

fn collect_pieces(parent: &Node, out: &mut Vec<Piece>) {
    let children = parent.child_nodes();
    for i in 0..children.length() {
        let Some(child) = children.item(i) else {
            continue;
        };
        match child.node_type() {
            Node::TEXT_NODE => {
                let text = child.node_value().unwrap_or_default().replace('\u{a0}', " ");
                out.push(Piece::Text { node: child, text });
            }
            Node::ELEMENT_NODE => {
                if child.node_name().eq_ignore_ascii_case("BR") {
                    out.push(Piece::Break(child));
                } else {
                    collect_pieces(&child, out);
                }
            }
            _ => {}
        }
    }
}

fn line_pieces(line: &Element) -> Vec<Piece> {
    let mut pieces = Vec::new();
    collect_pieces(line.as_ref(), &mut pieces);
    pieces
}

/// Plain text of a line, soft breaks as `'\n'`.
pub fn line_text(line: &Element) -> String {
    let mut pieces = line_pieces(line);
    if matches!(pieces.last(), Some(Piece::Break(_))) {
        pieces.pop();
    }
    let mut text = String::new();
    for piece in &pieces {
        match piece {
            Piece::Text { text: t, .. } => text.push_str(t),
            Piece::Break(_) => text.push('\n'),
        }
    }
    text
}

/// Map a DOM boundary point to a line position.
///
/// Points inside a line are measured by cloning the line's content up to the
/// point, which handles both text-node and element-child offsets. Points on a
/// container between lines snap to the start of the following line, or to the
/// end of the last line inside the container.
pub fn position_of(lines: &[DomLine], node: &Node, offset: u32) -> Option<TextPosition> {
    if let Some(index) = lines.iter().position(|l| l.element.contains(Some(node))) {
        let line = &lines[index];
        let chars = chars_before(&line.element, node, offset)?;
        return Some(TextPosition::new(index, chars.min(line.len())));
    }

    let inside: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| node.contains(Some(l.element.as_ref())))
        .map(|(i, _)| i)
        .collect();
    let last = *inside.last()?;
    match node.child_nodes().item(offset) {
        Some(child) => {
            let index = inside
                .iter()
                .copied()
                .find(|&i| child.contains(Some(lines[i].element.as_ref())))
                .or_else(|| {
                    // A stray node between lines: caret goes to the next line.
                    inside.iter().copied().find(|&i| {
                        let line: &Node = lines[i].element.as_ref();
                        child.compare_document_position(line) & Node::DOCUMENT_POSITION_FOLLOWING
                            != 0
                    })
                })
                .unwrap_or(last);
            Some(TextPosition::new(index, 0))
        }
        None => Some(TextPosition::new(last, lines[last].len())),
    }
}

fn chars_before(line: &Element, node: &Node, offset: u32) -> Option<usize> {
    let document = line.owner_document()?;
    let range = document.create_range().ok()?;
    range.set_start(line.as_ref(), 0).ok()?;
    range.set_end(node, offset).ok()?;
    let fragment = range.clone_contents().ok()?;
    let mut pieces = Vec::new();
    collect_pieces(fragment.as_ref(), &mut pieces);
    Some(pieces.iter().map(Piece::len).sum())
}

/// Map a char offset within a line to a DOM boundary point.
///
/// Offsets past the end land before the placeholder `br`, if any, so typed
/// text goes into the line rather than after its break.
pub fn dom_point(line: &Element, offset: usize) -> (Node, u32) {
    let pieces = line_pieces(line);
    let mut remaining = offset;
    for piece in &pieces {
        match piece {
            Piece::Text { node, text } => {
                let len = text.chars().count();
                if remaining <= len {
                    return (node.clone(), utf16_len(text, remaining));
                }
                remaining -= len;
            }
            Piece::Break(node) => {
                if remaining == 0 {
                    if let Some(point) = point_before(node) {
                        return point;
                    }
                }
                remaining = remaining.saturating_sub(1);
            }
        }
    }

    match pieces.last() {
        Some(Piece::Text { node, text }) => (node.clone(), utf16_len(text, usize::MAX)),
        Some(last @ Piece::Break(_)) => {
            point_before(last.node()).unwrap_or_else(|| (line.clone().into(), 0))
        }
        None => (line.clone().into(), 0),
    }
}

/// UTF-16 length of the first `chars` characters of `text`.
pub fn utf16_len(text: &str, chars: usize) -> u32 {
    text.chars().take(chars).map(|c| c.len_utf16() as u32).sum()
}

fn point_before(node: &Node) -> Option<(Node, u32)> {
    let parent = node.parent_node()?;
    let children = parent.child_nodes();
    let index = (0..children.length())
        .find(|&i| children.item(i).is_some_and(|c| c.is_same_node(Some(node))))?;
    Some((parent, index))
}
