//! Inline scanner for the two emphasis markers of the diary dialect.
//!
//! Exactly two patterns, applied in order:
//!
//! 1. `**text**` becomes bold (shortest match, at least one char inside)
//! 2. `*text*` becomes italic, where neither delimiter touches another `*`
//!
//! Bold spans are opaque to the italic pass, so italic may wrap a bold span
//! and bold content is itself italic-scanned. Nothing nests deeper than that.
//!
//! Where the two markers share an edge they form a run of three stars
//! (`***word***`, `**b*i***`, `***b** i*`). The bold span then takes whichever
//! star of the run leaves an even number of stars inside it, so the single
//! star pairs with its italic partner.

use crate::tree::RichNode;

enum Atom {
    Char(char),
    Bold(Vec<RichNode>),
}

impl Atom {
    fn is_star(&self) -> bool {
        matches!(self, Atom::Char('*'))
    }
}

/// Scan one line of raw Markdown text into inline nodes.
pub fn scan_inline(text: &str) -> Vec<RichNode> {
    let chars: Vec<char> = text.chars().collect();
    let atoms = bold_pass(&chars);
    italic_pass(&atoms)
}

fn bold_pass(chars: &[char]) -> Vec<Atom> {
    let mut atoms = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        if is_double_star(chars, i) {
            if let Some(close) = bold_close(chars, i) {
                let inner = &chars[i + 2..close];
                atoms.push(Atom::Bold(italic_pass(&bold_free_atoms(inner))));
                i = close + 2;
                continue;
            }
        }
        atoms.push(Atom::Char(chars[i]));
        i += 1;
    }
    atoms
}

fn is_double_star(chars: &[char], i: usize) -> bool {
    chars.get(i) == Some(&'*') && chars.get(i + 1) == Some(&'*')
}

/// Closing `**` for content starting at `start`, content non-empty.
fn find_bold_close(chars: &[char], start: usize) -> Option<usize> {
    (start + 1..chars.len()).find(|&j| is_double_star(chars, j))
}

/// Closing `**` for a bold span opened at `open`.
///
/// `None` also when the italic star of a shared opening run sits first: the
/// opener then moves one star right on the next iteration.
fn bold_close(chars: &[char], open: usize) -> Option<usize> {
    let close = find_bold_close(chars, open + 2)?;
    let stars = chars[open + 2..close].iter().filter(|&&c| c == '*').count();
    if stars % 2 == 1 {
        if chars.get(close + 2) == Some(&'*') {
            return Some(close + 1);
        }
        if chars.get(open + 2) == Some(&'*') {
            return None;
        }
    }
    Some(close)
}

fn bold_free_atoms(chars: &[char]) -> Vec<Atom> {
    chars.iter().copied().map(Atom::Char).collect()
}

/// A `*` atom at `i` with no `*` atom on either side.
fn is_lone_star(atoms: &[Atom], i: usize) -> bool {
    atoms[i].is_star()
        && !(i > 0 && atoms[i - 1].is_star())
        && !atoms.get(i + 1).is_some_and(Atom::is_star)
}

fn italic_pass(atoms: &[Atom]) -> Vec<RichNode> {
    let mut out = Vec::new();
    let mut text = String::new();
    let mut i = 0;
    while i < atoms.len() {
        if is_lone_star(atoms, i) {
            if let Some(close) = (i + 2..atoms.len()).find(|&k| is_lone_star(atoms, k)) {
                flush_text(&mut text, &mut out);
                out.push(RichNode::Italic(atoms_to_nodes(&atoms[i + 1..close])));
                i = close + 1;
                continue;
            }
        }
        match &atoms[i] {
            Atom::Char(c) => text.push(*c),
            Atom::Bold(children) => {
                flush_text(&mut text, &mut out);
                out.push(RichNode::Bold(children.clone()));
            }
        }
        i += 1;
    }
    flush_text(&mut text, &mut out);
    out
}

fn atoms_to_nodes(atoms: &[Atom]) -> Vec<RichNode> {
    let mut out = Vec::new();
    let mut text = String::new();
    for atom in atoms {
        match atom {
            Atom::Char(c) => text.push(*c),
            Atom::Bold(children) => {
                flush_text(&mut text, &mut out);
                out.push(RichNode::Bold(children.clone()));
            }
        }
    }
    flush_text(&mut text, &mut out);
    out
}

fn flush_text(text: &mut String, out: &mut Vec<RichNode>) {
    if !text.is_empty() {
        out.push(RichNode::Text(std::mem::take(text)));
    }
}
