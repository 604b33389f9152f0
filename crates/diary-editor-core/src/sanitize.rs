//! Whitelist HTML sanitizer.
//!
//! The only entry point for HTML that did not come out of [`crate::html::to_html`]:
//! clipboard payloads, stored markup, whatever a browser surface hands back.
//! Built on `ammonia`, configured down to the tag set the rich tree can express.

use std::collections::HashSet;

/// Tags that survive sanitization. Everything else is unwrapped.
pub const ALLOWED_TAGS: &[&str] = &[
    "p", "br", "b", "strong", "i", "em", "ul", "ol", "li", "div",
];

/// Tags whose *content* is removed along with the tag.
///
/// Script and style bodies are code, not prose, so unwrapping them would leak
/// source text into the entry.
const DROPPED_CONTENT_TAGS: &[&str] = &["script", "style"];

fn builder() -> ammonia::Builder<'static> {
    let mut builder = ammonia::Builder::empty();
    builder
        .tags(ALLOWED_TAGS.iter().copied().collect())
        .clean_content_tags(DROPPED_CONTENT_TAGS.iter().copied().collect())
        .generic_attributes(HashSet::new())
        .url_schemes(HashSet::new())
        .link_rel(None)
        .strip_comments(true);
    builder
}

/// Re-clean rounds before giving up on a fixed point.
const MAX_PASSES: usize = 6;

/// Strip `html` down to the allowed tag set with no attributes.
///
/// Disallowed tags are unwrapped so their text stays in place; malformed
/// markup is repaired by the HTML5 parser rather than rejected. One parse can
/// leave markup that a second parse repairs differently (a `<li>` inside a
/// `<p>`), so the output is cleaned again until it stops changing.
pub fn sanitize(html: &str) -> String {
    let builder = builder();
    let mut cleaned = drop_empty_blocks(builder.clean(html).to_string());
    let mut passes = 1;
    loop {
        let next = drop_empty_blocks(builder.clean(&cleaned).to_string());
        if next == cleaned {
            break;
        }
        cleaned = next;
        passes += 1;
        if passes >= MAX_PASSES {
            tracing::debug!(passes, "sanitizer output did not settle");
            break;
        }
    }
    if cleaned.len() != html.len() {
        tracing::trace!(
            before = html.len(),
            after = cleaned.len(),
            passes,
            "sanitizer removed markup"
        );
    }
    cleaned
}

/// Remove `<p></p>` and `<div></div>` left behind when the parser closes a
/// block early. Empty lines are always written as `<p><br></p>`.
fn drop_empty_blocks(mut html: String) -> String {
    loop {
        let before = html.len();
        html = html.replace("<p></p>", "").replace("<div></div>", "");
        if html.len() == before {
            return html;
        }
    }
}

/// Whether `tag` (lowercase) may appear in sanitized output.
pub fn is_allowed_tag(tag: &str) -> bool {
    ALLOWED_TAGS.contains(&tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_markup_kept() {
        let html = "<p>a <strong>b</strong> <em>c</em></p><ul><li>x</li></ul>";
        assert_eq!(sanitize(html), html);
    }

    #[test]
    fn test_attributes_removed() {
        assert_eq!(
            sanitize(r#"<p class="x" style="color:red" onclick="evil()">hi</p>"#),
            "<p>hi</p>"
        );
    }

    #[test]
    fn test_disallowed_tags_unwrapped() {
        assert_eq!(
            sanitize(r#"<p><span>keep</span> <a href="http://x">me</a></p>"#),
            "<p>keep me</p>"
        );
        assert_eq!(sanitize("<h1>Title</h1>"), "Title");
    }

    #[test]
    fn test_script_content_dropped() {
        assert_eq!(sanitize("<p>a</p><script>alert(1)</script>"), "<p>a</p>");
    }

    #[test]
    fn test_comments_stripped() {
        assert_eq!(sanitize("<p>a<!-- secret -->b</p>"), "<p>ab</p>");
    }

    #[test]
    fn test_text_is_escaped() {
        assert_eq!(sanitize("1 &lt; 2 &amp; 3"), "1 &lt; 2 &amp; 3");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "<p>plain</p>",
            "<div><p>nested <b>bold <i>both</i></b></p></div>",
            "<ul><li>one<li>two</ul><p>unclosed",
            "<table><tr><td>cell</td></tr></table>",
            "<p><img src=x onerror=alert(1)>after</p>",
            "text & <weird> </tags>",
            "<b><p>block in inline</p></b>",
            "<style>p{}</style><ol><li><br></li></ol>",
            "<p><select><li>x",
            "",
        ];
        for input in inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn test_list_item_escaping_paragraph_settles() {
        let once = sanitize("<p><select><li>x");
        assert_eq!(once, "<li>x</li>");
        assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn test_parser_artefact_paragraphs_dropped() {
        let cleaned = sanitize("<p><h1>x</h1></p>");
        assert!(!cleaned.contains("<p></p>"), "{cleaned:?}");
        assert_eq!(cleaned, "x");
        // Real empty lines survive.
        assert_eq!(sanitize("<p>a</p><p><br></p>"), "<p>a</p><p><br></p>");
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        const TOKENS: &[&str] = &[
            "<p>", "</p>", "<div>", "</div>", "<ul>", "</ul>", "<ol>", "</ol>", "<li>",
            "</li>", "<b>", "</b>", "<i>", "</i>", "<br>", "<select>", "</select>",
            "<table>", "<tr>", "<td>", "</table>", "<h1>", "</h1>", "<span>", "<script>",
            "</script>", "<!--", "-->", "x", "y z", "&amp;", "<",
        ];

        fn tag_soup() -> impl Strategy<Value = String> {
            prop::collection::vec(prop::sample::select(TOKENS), 0..24)
                .prop_map(|tokens| tokens.concat())
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(2000))]

            #[test]
            fn sanitize_is_idempotent(html in tag_soup()) {
                let once = sanitize(&html);
                prop_assert_eq!(sanitize(&once), once);
            }

            #[test]
            fn sanitize_leaves_no_empty_paragraphs(html in tag_soup()) {
                let cleaned = sanitize(&html);
                prop_assert!(!cleaned.contains("<p></p>"));
            }
        }
    }

    #[test]
    fn test_allowed_tag_lookup() {
        assert!(is_allowed_tag("li"));
        assert!(!is_allowed_tag("span"));
    }
}
