//! Rich tree to Markdown serializer.
//!
//! Structural inverse of [`crate::compile::compile`]. Every non-empty block is
//! followed by one separator blank line. An empty paragraph after a block adds
//! one more newline without resetting the "after a block" state, so a run of K
//! empty paragraphs comes back as K visible blank lines.

use crate::tree::{RichDocument, RichNode};

/// Serialize a rich tree to diary Markdown.
///
/// Ordered lists are renumbered from 1. The output is trimmed.
pub fn serialize(document: &RichDocument) -> String {
    let document = document.normalized();
    let mut out = String::new();
    let mut after_block = false;

    for node in &document.nodes {
        match node {
            RichNode::Paragraph(children) => {
                let content = serialize_inlines(trim_trailing_breaks(children));
                if content.trim().is_empty() {
                    if after_block {
                        out.push('\n');
                    }
                } else {
                    out.push_str(&content);
                    out.push_str("\n\n");
                    after_block = true;
                }
            }
            RichNode::UnorderedList(items) => {
                write_list(&mut out, items, |_| "- ".to_string());
                after_block = true;
            }
            RichNode::OrderedList(items) => {
                write_list(&mut out, items, |i| format!("{}. ", i + 1));
                after_block = true;
            }
            // normalized() leaves only paragraphs and lists at the top level.
            _ => {}
        }
    }

    out.trim().to_string()
}

fn write_list(out: &mut String, items: &[RichNode], marker: impl Fn(usize) -> String) {
    let lines: Vec<String> = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let content = serialize_inlines(trim_trailing_breaks(item.children()));
            format!("{}{}", marker(i), content)
        })
        .collect();
    out.push_str(&lines.join("\n"));
    out.push_str("\n\n");
}

/// Browsers keep a placeholder `<br>` at the end of a block; it carries no content.
pub(crate) fn trim_trailing_breaks(children: &[RichNode]) -> &[RichNode] {
    let end = children
        .iter()
        .rposition(|n| !matches!(n, RichNode::LineBreak))
        .map_or(0, |i| i + 1);
    &children[..end]
}

/// Emphasis state while walking inline content.
#[derive(Clone, Copy, Default)]
struct Marks {
    bold: bool,
    italic: bool,
}

/// Serialize inline nodes (text, emphasis, soft breaks).
pub fn serialize_inlines(nodes: &[RichNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_inline(&mut out, node, Marks::default());
    }
    out
}

fn write_inline(out: &mut String, node: &RichNode, marks: Marks) {
    match node {
        RichNode::Text(text) => out.push_str(text),
        RichNode::LineBreak => out.push('\n'),
        RichNode::Bold(children) => {
            // Bold inside bold collapses to a single level.
            if marks.bold {
                write_children(out, children, marks);
            } else {
                wrap(out, "**", children, Marks { bold: true, ..marks });
            }
        }
        RichNode::Italic(children) => {
            if marks.italic {
                write_children(out, children, marks);
            } else {
                wrap(out, "*", children, Marks { italic: true, ..marks });
            }
        }
        block => write_children(out, block.children(), marks),
    }
}

fn wrap(out: &mut String, marker: &str, children: &[RichNode], marks: Marks) {
    let mut inner = String::new();
    write_children(&mut inner, children, marks);
    if inner.is_empty() {
        return;
    }
    out.push_str(marker);
    out.push_str(&inner);
    out.push_str(marker);
}

fn write_children(out: &mut String, children: &[RichNode], marks: Marks) {
    for child in children {
        write_inline(out, child, marks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use RichNode::*;

    fn text(s: &str) -> RichNode {
        RichNode::text(s)
    }

    fn para(s: &str) -> RichNode {
        Paragraph(vec![text(s)])
    }

    fn doc(nodes: Vec<RichNode>) -> RichDocument {
        RichDocument::new(nodes)
    }

    #[test]
    fn test_paragraphs_separated_by_blank_line() {
        assert_eq!(serialize(&doc(vec![para("a"), para("b")])), "a\n\nb");
    }

    #[test]
    fn test_empty_paragraph_runs() {
        let one = doc(vec![para("a"), Paragraph(vec![]), para("b")]);
        assert_eq!(serialize(&one), "a\n\n\nb");

        let two = doc(vec![
            para("a"),
            Paragraph(vec![LineBreak]),
            Paragraph(vec![]),
            para("b"),
        ]);
        assert_eq!(serialize(&two), "a\n\n\n\nb");
    }

    #[test]
    fn test_leading_empty_paragraphs_dropped() {
        let d = doc(vec![Paragraph(vec![]), Paragraph(vec![]), para("x")]);
        assert_eq!(serialize(&d), "x");
    }

    #[test]
    fn test_lists_renumber() {
        let d = doc(vec![OrderedList(vec![
            ListItem(vec![text("a")]),
            ListItem(vec![text("b")]),
            ListItem(vec![text("c")]),
        ])]);
        assert_eq!(serialize(&d), "1. a\n2. b\n3. c");
    }

    #[test]
    fn test_list_between_paragraphs() {
        let d = doc(vec![
            para("top"),
            UnorderedList(vec![ListItem(vec![text("x")]), ListItem(vec![text("y")])]),
            para("bottom"),
        ]);
        assert_eq!(serialize(&d), "top\n\n- x\n- y\n\nbottom");
    }

    #[test]
    fn test_soft_break_is_single_newline() {
        let d = doc(vec![Paragraph(vec![text("a"), LineBreak, text("b")])]);
        assert_eq!(serialize(&d), "a\nb");
    }

    #[test]
    fn test_trailing_placeholder_break_ignored() {
        let d = doc(vec![Paragraph(vec![text("a"), LineBreak]), para("b")]);
        assert_eq!(serialize(&d), "a\n\nb");
    }

    #[test]
    fn test_emphasis() {
        let d = doc(vec![Paragraph(vec![
            Bold(vec![text("b"), Bold(vec![text("B")])]),
            text(" "),
            Italic(vec![text("i"), Bold(vec![text("ib")])]),
        ])]);
        assert_eq!(serialize(&d), "**bB** *i**ib***");
    }

    #[test]
    fn test_nested_emphasis_reads_back() {
        use crate::compile::compile;

        let cases = [
            (Bold(vec![Italic(vec![text("word")])]), "***word***"),
            (Bold(vec![text("b"), Italic(vec![text("i")])]), "**b*i***"),
            (Bold(vec![Italic(vec![text("i")]), text("b")]), "***i*b**"),
            (Italic(vec![text("a "), Bold(vec![text("b")])]), "*a **b***"),
            (Italic(vec![Bold(vec![text("b")]), text(" i")]), "***b** i*"),
        ];
        for (inline, markdown) in cases {
            let d = doc(vec![Paragraph(vec![inline])]);
            assert_eq!(serialize(&d), markdown);
            assert_eq!(compile(markdown), d, "markdown: {markdown:?}");
        }
    }

    #[test]
    fn test_italic_around_whole_bold_reads_back_bold_outside() {
        use crate::compile::compile;

        let d = doc(vec![Paragraph(vec![Italic(vec![Bold(vec![text("w")])])])]);
        assert_eq!(serialize(&d), "***w***");
        assert_eq!(compile(&serialize(&d)), d.normalized());
    }

    #[test]
    fn test_empty_item_keeps_marker() {
        let d = doc(vec![
            para("a"),
            OrderedList(vec![ListItem(vec![LineBreak]), ListItem(vec![text("b")])]),
        ]);
        assert_eq!(serialize(&d), "a\n\n1. \n2. b");
    }
}
