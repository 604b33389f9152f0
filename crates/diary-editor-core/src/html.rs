//! Conversion between the rich tree and HTML markup.
//!
//! `to_html` produces the markup a browser surface displays. `parse_html`
//! goes the other way and always runs the sanitizer first, so the tag scanner
//! below only ever sees attribute-free markup from the allowed set.

use pulldown_cmark_escape::{FmtWriter, escape_html};

use crate::sanitize::{is_allowed_tag, sanitize};
use crate::tree::{RichDocument, RichNode};

/// Render the tree as HTML.
///
/// An empty paragraph renders as `<p><br></p>` so it keeps its line height.
pub fn to_html(document: &RichDocument) -> String {
    let mut out = String::new();
    for node in &document.nodes {
        write_node(&mut out, node);
    }
    out
}

fn write_node(out: &mut String, node: &RichNode) {
    match node {
        RichNode::Paragraph(children) => {
            out.push_str("<p>");
            if children.is_empty() {
                out.push_str("<br>");
            }
            write_children(out, children);
            out.push_str("</p>");
        }
        RichNode::UnorderedList(items) => wrap(out, "ul", items),
        RichNode::OrderedList(items) => wrap(out, "ol", items),
        RichNode::ListItem(children) => {
            out.push_str("<li>");
            if children.is_empty() {
                out.push_str("<br>");
            }
            write_children(out, children);
            out.push_str("</li>");
        }
        RichNode::Bold(children) => wrap(out, "strong", children),
        RichNode::Italic(children) => wrap(out, "em", children),
        RichNode::Text(text) => {
            // Writing into a String cannot fail.
            let _ = escape_html(FmtWriter(&mut *out), text);
        }
        RichNode::LineBreak => out.push_str("<br>"),
    }
}

fn wrap(out: &mut String, tag: &str, children: &[RichNode]) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    write_children(out, children);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn write_children(out: &mut String, children: &[RichNode]) {
    for child in children {
        write_node(out, child);
    }
}

/// Parse untrusted HTML into a normalized rich tree.
///
/// Never fails: unknown or unbalanced tags are skipped and the remaining
/// content is kept.
pub fn parse_html(html: &str) -> RichDocument {
    let clean = sanitize(html);
    let raw = RichDocument::new(scan(&clean));
    raw.normalized()
}

/// Open element on the scanner's stack.
struct Frame {
    tag: String,
    children: Vec<RichNode>,
}

fn scan(html: &str) -> Vec<RichNode> {
    let mut stack = vec![Frame {
        tag: String::new(),
        children: Vec::new(),
    }];
    let mut rest = html;

    while !rest.is_empty() {
        let Some(lt) = rest.find('<') else {
            push_text(&mut stack, rest);
            break;
        };
        if lt > 0 {
            push_text(&mut stack, &rest[..lt]);
        }
        let after = &rest[lt..];
        let Some(gt) = after.find('>') else {
            // Dangling '<' is literal text.
            push_text(&mut stack, after);
            break;
        };
        let inner = &after[1..gt];
        rest = &after[gt + 1..];

        let closing = inner.starts_with('/');
        let name: String = inner
            .trim_start_matches('/')
            .trim_end_matches('/')
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();

        if !is_allowed_tag(&name) {
            tracing::trace!(tag = %name, "skipping tag outside the allowed set");
            continue;
        }
        if name == "br" {
            if !closing {
                top(&mut stack).children.push(RichNode::LineBreak);
            }
            continue;
        }
        if closing {
            close(&mut stack, &name);
        } else {
            stack.push(Frame {
                tag: name,
                children: Vec::new(),
            });
        }
    }

    while stack.len() > 1 {
        pop_into_parent(&mut stack);
    }
    stack.pop().map(|f| f.children).unwrap_or_default()
}

fn top(stack: &mut [Frame]) -> &mut Frame {
    let last = stack.len() - 1;
    &mut stack[last]
}

fn push_text(stack: &mut [Frame], raw: &str) {
    let text = decode_entities(raw);
    if text.is_empty() {
        return;
    }
    let frame = top(stack);
    match frame.children.last_mut() {
        Some(RichNode::Text(prev)) => prev.push_str(&text),
        _ => frame.children.push(RichNode::Text(text)),
    }
}

fn close(stack: &mut Vec<Frame>, name: &str) {
    // Ignore a closing tag with no matching open element.
    let Some(depth) = stack.iter().rposition(|f| f.tag == name) else {
        return;
    };
    if depth == 0 {
        return;
    }
    while stack.len() > depth {
        pop_into_parent(stack);
    }
}

fn pop_into_parent(stack: &mut Vec<Frame>) {
    let Some(frame) = stack.pop() else {
        return;
    };
    let node = match frame.tag.as_str() {
        "p" | "div" => RichNode::Paragraph(frame.children),
        "ul" => RichNode::UnorderedList(frame.children),
        "ol" => RichNode::OrderedList(frame.children),
        "li" => RichNode::ListItem(frame.children),
        "b" | "strong" => RichNode::Bold(frame.children),
        "i" | "em" => RichNode::Italic(frame.children),
        _ => return,
    };
    top(stack).children.push(node);
}

/// Decode the entities an HTML serializer emits for text content.
///
/// Raw newlines are insignificant in HTML and become spaces; non-breaking
/// spaces, which browsers insert for runs of spaces, become plain spaces.
fn decode_entities(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        push_plain(&mut out, &rest[..amp]);
        let after = &rest[amp..];
        match after.find(';').filter(|&semi| semi <= 10) {
            Some(semi) => match decode_entity(&after[1..semi]) {
                Some(c) => {
                    out.push(c);
                    rest = &after[semi + 1..];
                }
                None => {
                    out.push('&');
                    rest = &after[1..];
                }
            },
            None => {
                out.push('&');
                rest = &after[1..];
            }
        }
    }
    push_plain(&mut out, rest);
    out
}

fn push_plain(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '\n' | '\r' | '\u{a0}' => out.push(' '),
            c => out.push(c),
        }
    }
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code).map(|c| if c == '\u{a0}' { ' ' } else { c })
        }
    }
}
