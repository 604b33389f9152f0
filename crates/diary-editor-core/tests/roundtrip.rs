//! End-to-end behaviour of the Markdown <-> rich tree pipeline and the
//! editing session, driven through the public API only.

use std::cell::RefCell;
use std::rc::Rc;

use diary_editor_core::{
    EditingSurface, EditorConfig, EditorSession, LineKind, MemorySurface, Modifiers, RichNode,
    TextRange, compile, is_structurally_empty, parse_html, sanitize, serialize, text_length,
    to_html,
};

fn roundtrip(markdown: &str) -> String {
    serialize(&compile(markdown))
}

#[test]
fn roundtrip_preserves_supported_markdown() {
    let cases = [
        "plain",
        "Hello **world**",
        "an *aside* and **both *kinds***",
        "Line 1\n\nLine 2",
        "Line 1\n\n\nLine 2",
        "Line 1\n\n\n\nLine 2",
        "- a\n- b",
        "1. a\n2. b\n3. c",
        "intro\n\n- a\n- b\n\n1. one\n\noutro",
        "<script>alert(1)</script>",
        "2 * 3 * 4",
        "日記\n\n\n- 今日",
        "***word***",
        "**b*i***",
        "***i*b**",
        "*a **b***",
        "***b** i*",
    ];
    for case in cases {
        let tree = compile(case);
        assert_eq!(roundtrip(case), case, "case: {case:?}");
        assert_eq!(compile(&serialize(&tree)), tree, "case: {case:?}");
    }
}

#[test]
fn nested_emphasis_keeps_its_shape() {
    use RichNode::{Bold, Italic, Paragraph};
    let text = |s: &str| RichNode::text(s);

    let cases = [
        ("***word***", Bold(vec![Italic(vec![text("word")])])),
        ("**b*i***", Bold(vec![text("b"), Italic(vec![text("i")])])),
        ("***i*b**", Bold(vec![Italic(vec![text("i")]), text("b")])),
        ("*a **b***", Italic(vec![text("a "), Bold(vec![text("b")])])),
        ("***b** i*", Italic(vec![Bold(vec![text("b")]), text(" i")])),
    ];
    for (markdown, inline) in cases {
        let tree = compile(markdown);
        assert_eq!(tree.nodes, vec![Paragraph(vec![inline])], "{markdown:?}");
        assert_eq!(compile(&serialize(&tree)), tree, "{markdown:?}");
    }
}

#[test]
fn blank_line_counts_survive() {
    let one = compile("Line 1\n\n\nLine 2");
    let empties = one
        .nodes
        .iter()
        .filter(|n| matches!(n, RichNode::Paragraph(c) if c.is_empty()))
        .count();
    assert_eq!(empties, 1);

    let none = compile("Line 1\n\nLine 2");
    assert_eq!(none.nodes.len(), 2);
}

#[test]
fn ordered_lists_are_renumbered() {
    assert_eq!(roundtrip("1. a\n5. b"), "1. a\n2. b");
    assert_eq!(roundtrip("3. a\n3. b\n3. c"), "1. a\n2. b\n3. c");
}

#[test]
fn end_to_end_list_spacing() {
    assert_eq!(
        roundtrip("Hello **world**\n- a\n- b\nEnd"),
        "Hello **world**\n\n- a\n- b\n\nEnd"
    );
}

#[test]
fn roundtrip_through_html() {
    let markdown = "Hello **world**\n\n\n- a\n- *b*\n\n1. x\n\nEnd";
    let html = to_html(&compile(markdown));
    assert_eq!(serialize(&parse_html(&html)), markdown);
}

#[test]
fn script_never_becomes_markup() {
    let html = to_html(&compile("<script>alert(1)</script>"));
    assert_eq!(html, "<p>&lt;script&gt;alert(1)&lt;/script&gt;</p>");
    assert_eq!(sanitize(&html), html);
}

#[test]
fn sanitize_is_idempotent_on_browser_markup() {
    let inputs = [
        r#"<div class="x"><span style="font-weight:bold">a</span></div><div><br></div>"#,
        "<meta charset='utf-8'><b style=\"\">pasted</b><br class=\"Apple-interchange-newline\">",
        "<ul><li><p>nested</p><ul><li>deeper</li></ul></li></ul>",
        "<p>a<p>b</p></p>",
        "<iframe src=x></iframe><svg><script>1</script></svg>text",
    ];
    for input in inputs {
        let once = sanitize(input);
        assert_eq!(sanitize(&once), once, "input: {input:?}");
    }
}

#[test]
fn browser_markup_is_normalized() {
    let doc = parse_html("<div>first</div><div><br></div><div>second</div>");
    assert_eq!(serialize(&doc), "first\n\n\nsecond");
}

#[test]
fn emptiness_oracle() {
    let empty_paragraph = parse_html("<p><br></p>");
    assert_eq!(text_length(&empty_paragraph), 0);
    assert!(is_structurally_empty(&empty_paragraph));

    let empty_item = parse_html("<ul><li><br></li></ul>");
    assert_eq!(text_length(&empty_item), 0);
    assert!(!is_structurally_empty(&empty_item));
}

fn recording_session(markdown: &str) -> (EditorSession<MemorySurface>, Rc<RefCell<Vec<String>>>) {
    let mut session = EditorSession::new(MemorySurface::new(), EditorConfig::default());
    session.set_content(markdown).unwrap();
    let changes = Rc::new(RefCell::new(Vec::new()));
    let sink = changes.clone();
    session.set_on_change(move |md| sink.borrow_mut().push(md.to_string()));
    let end = session.surface().end_position();
    session
        .surface_mut()
        .set_selection(TextRange::caret(end))
        .unwrap();
    (session, changes)
}

#[test]
fn composition_fires_exactly_one_change() {
    let (mut session, changes) = recording_session("Today:");
    session.composition_start();
    for syllable in [" 가", "나", "다"] {
        session.surface_mut().type_text(syllable).unwrap();
        assert!(!session.content_changed());
    }
    assert!(changes.borrow().is_empty());

    session.composition_end();
    assert_eq!(*changes.borrow(), vec!["Today: 가나다".to_string()]);
}

#[test]
fn enter_on_empty_item_leaves_list() {
    let (mut session, _) = recording_session("- first");
    session.handle_enter(Modifiers::NONE).unwrap();
    assert_eq!(
        session.surface().line(1).map(|l| l.kind),
        Some(LineKind::Bullet)
    );

    session.handle_enter(Modifiers::NONE).unwrap();
    assert_eq!(session.surface().line_count(), 2);
    assert_eq!(
        session.surface().line(1).map(|l| l.kind),
        Some(LineKind::Paragraph)
    );
    assert_eq!(session.get_markdown(), "- first");
}

#[test]
fn session_output_is_stable_under_reload() {
    let (mut session, _) = recording_session("start");
    session.handle_enter(Modifiers::NONE).unwrap();
    session.handle_enter(Modifiers::NONE).unwrap();
    session.surface_mut().type_text("end **bold**").unwrap();
    session.content_changed();

    let saved = session.get_markdown().to_string();
    assert_eq!(saved, "start\n\n\nend **bold**");

    let mut reloaded = EditorSession::new(MemorySurface::new(), EditorConfig::default());
    reloaded.set_content(&saved).unwrap();
    assert_eq!(reloaded.get_markdown(), saved);
    assert_eq!(reloaded.document(), session.document());
}
