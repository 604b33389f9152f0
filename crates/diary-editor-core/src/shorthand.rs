//! Live Markdown shorthand: `**word**` or `*word*` typed into the rich surface.
//!
//! Only a pattern whose closing marker ends exactly at the caret is a match.
//! The delimiter rules are the same as the inline scanner's, so converting a
//! match never changes what the entry serializes to.

use crate::types::InlineFormat;

/// A shorthand pattern found at the end of a line prefix. Offsets are chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShorthandMatch {
    pub format: InlineFormat,
    /// First char of the opening marker.
    pub start: usize,
    /// One past the closing marker (the caret).
    pub end: usize,
}

impl ShorthandMatch {
    pub fn marker_len(&self) -> usize {
        self.format.marker().len()
    }

    /// Char count of the text between the markers.
    pub fn content_len(&self) -> usize {
        self.end - self.start - 2 * self.marker_len()
    }
}

/// Look for `**x**` or `*x*` ending at the end of `before_caret`.
pub fn find_at_caret(before_caret: &str) -> Option<ShorthandMatch> {
    let chars: Vec<char> = before_caret.chars().collect();
    find_bold(&chars).or_else(|| find_italic(&chars))
}

fn find_bold(chars: &[char]) -> Option<ShorthandMatch> {
    let end = chars.len();
    if end < 5 || chars[end - 1] != '*' || chars[end - 2] != '*' {
        return None;
    }
    let body = &chars[..end - 2];
    let open = (0..body.len().saturating_sub(1))
        .rev()
        .find(|&i| body[i] == '*' && body[i + 1] == '*')?;
    let content = &body[open + 2..];
    is_valid_content(content).then_some(ShorthandMatch {
        format: InlineFormat::Bold,
        start: open,
        end,
    })
}

fn find_italic(chars: &[char]) -> Option<ShorthandMatch> {
    let end = chars.len();
    if end < 3 || chars[end - 1] != '*' || chars[end - 2] == '*' {
        return None;
    }
    let body = &chars[..end - 1];
    let open = body.iter().rposition(|&c| c == '*')?;
    if open > 0 && body[open - 1] == '*' {
        return None;
    }
    let content = &body[open + 1..];
    is_valid_content(content).then_some(ShorthandMatch {
        format: InlineFormat::Italic,
        start: open,
        end,
    })
}

fn is_valid_content(content: &[char]) -> bool {
    !content.is_empty()
        && !content.iter().all(|c| c.is_whitespace())
        && !content.contains(&'\n')
        && !content.contains(&'*')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bold_at_caret() {
        let m = find_at_caret("say **hi**").unwrap();
        assert_eq!(m.format, InlineFormat::Bold);
        assert_eq!((m.start, m.end), (4, 10));
        assert_eq!(m.content_len(), 2);
    }

    #[test]
    fn test_italic_at_caret() {
        let m = find_at_caret("an *aside*").unwrap();
        assert_eq!(m.format, InlineFormat::Italic);
        assert_eq!((m.start, m.end), (3, 10));
        assert_eq!(m.content_len(), 5);
    }

    #[test]
    fn test_half_typed_bold_is_not_italic() {
        assert_eq!(find_at_caret("**bold*"), None);
    }

    #[test]
    fn test_misses() {
        assert_eq!(find_at_caret("****"), None);
        assert_eq!(find_at_caret("** **"), None);
        assert_eq!(find_at_caret("*a* b"), None);
        assert_eq!(find_at_caret("no markers"), None);
        assert_eq!(find_at_caret("*a\nb*"), None);
        assert_eq!(find_at_caret(""), None);
    }

    #[test]
    fn test_multibyte_offsets_are_chars() {
        let m = find_at_caret("日記 *今日*").unwrap();
        assert_eq!((m.start, m.end), (3, 7));
    }
}
