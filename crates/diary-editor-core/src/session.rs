//! Editing session: the state machine between a surface and the host.
//!
//! The session owns the last committed rich tree and its Markdown. The surface
//! owns the live content and the selection. A commit reads the surface back,
//! serializes it and notifies the host; nothing is committed while an IME
//! composition is in progress.

use crate::actions::{EditorAction, Key, KeyResult, Modifiers, action_for_shortcut};
use crate::compile::compile;
use crate::config::EditorConfig;
use crate::content::ContentStats;
use crate::platform::{ClipboardData, EditingSurface, PlatformError};
use crate::serialize::serialize;
use crate::shorthand::find_at_caret;
use crate::tree::RichDocument;
use crate::types::{CompositionState, InlineFormat, LineKind, TextPosition, TextRange};

type ChangeCallback = Box<dyn FnMut(&str)>;

pub struct EditorSession<S: EditingSurface> {
    surface: S,
    config: EditorConfig,
    document: RichDocument,
    markdown: String,
    stats: ContentStats,
    composition: CompositionState,
    on_change: Option<ChangeCallback>,
}

impl<S: EditingSurface> EditorSession<S> {
    pub fn new(surface: S, config: EditorConfig) -> Self {
        let document = surface.read_document();
        let markdown = serialize(&document);
        let stats = ContentStats::measure(&document, config.max_length);
        Self {
            surface,
            config,
            document,
            markdown,
            stats,
            composition: CompositionState::Idle,
            on_change: None,
        }
    }

    /// Register the callback fired after every committed change.
    pub fn set_on_change(&mut self, callback: impl FnMut(&str) + 'static) {
        self.on_change = Some(Box::new(callback));
    }

    pub fn clear_on_change(&mut self) {
        self.on_change = None;
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: EditorConfig) {
        self.stats = ContentStats::measure(&self.document, config.max_length);
        self.config = config;
    }

    /// The last committed tree.
    pub fn document(&self) -> &RichDocument {
        &self.document
    }

    /// Markdown of the last committed tree.
    pub fn get_markdown(&self) -> &str {
        &self.markdown
    }

    pub fn stats(&self) -> ContentStats {
        self.stats
    }

    pub fn is_composing(&self) -> bool {
        self.composition == CompositionState::Composing
    }

    /// Replace the content. Does not notify: the host already knows this value.
    pub fn set_content(&mut self, markdown: &str) -> Result<(), PlatformError> {
        let document = compile(markdown);
        self.surface.render(&document)?;
        self.composition = CompositionState::Idle;
        self.document = self.surface.read_document();
        self.markdown = serialize(&self.document);
        self.stats = ContentStats::measure(&self.document, self.config.max_length);
        tracing::debug!(chars = self.stats.chars, "content loaded");
        Ok(())
    }

    pub fn composition_start(&mut self) {
        if self.is_composing() {
            tracing::debug!("composition already in progress, ignoring start");
            return;
        }
        self.composition = CompositionState::Composing;
    }

    /// End a composition and commit what it produced.
    ///
    /// Returns false when no composition was in progress.
    pub fn composition_end(&mut self) -> bool {
        if !self.is_composing() {
            tracing::debug!("composition end without start, ignoring");
            return false;
        }
        self.composition = CompositionState::Idle;
        self.commit();
        true
    }

    /// The surface content changed on its own (typing, deletion, native command).
    ///
    /// Returns false when the change was suppressed by a composition.
    pub fn content_changed(&mut self) -> bool {
        if self.is_composing() {
            tracing::trace!("content change during composition suppressed");
            return false;
        }
        if self.config.live_shorthand {
            if let Err(err) = self.apply_shorthand() {
                tracing::warn!(%err, "shorthand conversion failed");
            }
        }
        self.commit();
        true
    }

    /// Insert the plain-text part of a paste. Markup is never inserted.
    ///
    /// Refused while a composition is in progress.
    pub fn paste(&mut self, data: &ClipboardData) -> Result<bool, PlatformError> {
        if self.is_composing() {
            tracing::debug!("paste during composition ignored");
            return Ok(false);
        }
        if data.html.is_some() {
            tracing::debug!("discarding html paste payload");
        }
        let Some(text) = data.plain.as_deref() else {
            return Ok(false);
        };
        let Some(range) = self.surface.selection() else {
            return Ok(false);
        };
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        let caret = self.surface.replace_range(range, &text)?;
        self.surface.set_selection(TextRange::caret(caret))?;
        self.commit();
        Ok(true)
    }

    /// Toolbar or shortcut formatting.
    ///
    /// With a collapsed selection this tries the shorthand conversion instead,
    /// so a user who typed `**word**` and hits Bold gets a bold word.
    pub fn toggle_format(&mut self, format: InlineFormat) -> Result<bool, PlatformError> {
        if self.is_composing() {
            return Ok(false);
        }
        let Some(range) = self.surface.selection() else {
            return Ok(false);
        };
        let changed = if range.is_collapsed() {
            self.apply_shorthand()?
        } else {
            self.surface.apply_inline_format(range, format)?
        };
        if changed {
            self.commit();
        }
        Ok(changed)
    }

    /// Convert a `**x**` or `*x*` pattern that ends at the caret.
    ///
    /// A miss is not an error: the surface is left untouched and `Ok(false)`
    /// is returned.
    pub fn apply_shorthand(&mut self) -> Result<bool, PlatformError> {
        if self.is_composing() {
            return Ok(false);
        }
        let Some(range) = self.surface.selection() else {
            return Ok(false);
        };
        if !range.is_collapsed() {
            return Ok(false);
        }
        let caret = range.head;
        let Some(line) = self.surface.line(caret.line) else {
            return Ok(false);
        };
        let before: String = line.text.chars().take(caret.offset).collect();
        let Some(found) = find_at_caret(&before) else {
            return Ok(false);
        };

        let content: String = before
            .chars()
            .skip(found.start + found.marker_len())
            .take(found.content_len())
            .collect();
        let pattern = TextRange::in_line(caret.line, found.start, found.end);
        self.surface.replace_range(pattern, &content)?;

        let content_end = found.start + found.content_len();
        let content_range = TextRange::in_line(caret.line, found.start, content_end);
        self.surface.apply_inline_format(content_range, found.format)?;
        self.surface
            .set_selection(TextRange::caret(TextPosition::new(caret.line, content_end)))?;
        tracing::debug!(format = ?found.format, "applied shorthand");
        Ok(true)
    }

    /// Enter handling for the rich surface.
    ///
    /// - Ctrl/Cmd+Enter is left to the host (usually "save")
    /// - Shift+Enter inserts a soft break
    /// - Enter on an empty list item turns it into a paragraph, leaving the list
    /// - any other Enter splits the line; in a list that makes a new item
    pub fn handle_enter(&mut self, modifiers: Modifiers) -> Result<KeyResult, PlatformError> {
        if modifiers.primary() || self.is_composing() {
            return Ok(KeyResult::PassThrough);
        }
        let Some(range) = self.surface.selection() else {
            return Ok(KeyResult::PassThrough);
        };
        let caret = if range.is_collapsed() {
            range.head
        } else {
            self.surface.replace_range(range, "")?
        };

        if modifiers.shift {
            self.surface.insert_line_break(caret)?;
            self.commit();
            return Ok(KeyResult::Handled);
        }

        let Some(line) = self.surface.line(caret.line) else {
            return Ok(KeyResult::PassThrough);
        };
        if line.kind.is_list() && line.is_blank() && self.config.list_continuation {
            if !line.is_empty() {
                self.surface
                    .replace_range(TextRange::in_line(caret.line, 0, line.len()), "")?;
            }
            self.surface.set_line_kind(caret.line, LineKind::Paragraph)?;
            self.surface
                .set_selection(TextRange::caret(TextPosition::new(caret.line, 0)))?;
            tracing::debug!(line = caret.line, "left list on empty item");
        } else {
            let next = self.surface.split_line(caret)?;
            if line.kind.is_list() && !self.config.list_continuation {
                self.surface.set_line_kind(next.line, LineKind::Paragraph)?;
            }
        }
        self.commit();
        Ok(KeyResult::Handled)
    }

    /// Keydown dispatch: Enter and the formatting shortcuts.
    pub fn handle_key(
        &mut self,
        key: &Key,
        modifiers: Modifiers,
    ) -> Result<KeyResult, PlatformError> {
        if *key == Key::Enter {
            return self.handle_enter(modifiers);
        }
        match action_for_shortcut(key, modifiers) {
            Some(action) => self.handle_action(action),
            None => Ok(KeyResult::PassThrough),
        }
    }

    pub fn handle_action(&mut self, action: EditorAction) -> Result<KeyResult, PlatformError> {
        if self.is_composing() {
            return Ok(KeyResult::PassThrough);
        }
        let handled = match action {
            EditorAction::Insert { text } => match self.surface.selection() {
                Some(range) => {
                    let caret = self.surface.replace_range(range, &text)?;
                    self.surface.set_selection(TextRange::caret(caret))?;
                    self.content_changed();
                    true
                }
                None => false,
            },
            EditorAction::InsertLineBreak => {
                return self.handle_enter(Modifiers::SHIFT);
            }
            EditorAction::InsertParagraph => {
                return self.handle_enter(Modifiers::NONE);
            }
            EditorAction::ToggleFormat(format) => {
                // Formatting shortcuts are ours even when there is nothing to format.
                self.toggle_format(format)?;
                true
            }
            EditorAction::ToggleList { ordered } => self.toggle_list(ordered)?,
            EditorAction::Paste { text } => self.paste(&ClipboardData::plain(text))?,
        };
        Ok(if handled {
            KeyResult::Handled
        } else {
            KeyResult::PassThrough
        })
    }

    fn toggle_list(&mut self, ordered: bool) -> Result<bool, PlatformError> {
        let Some(range) = self.surface.selection() else {
            return Ok(false);
        };
        let target = if ordered {
            LineKind::Numbered
        } else {
            LineKind::Bullet
        };
        let (start, end) = (range.start().line, range.end().line);
        let all_target = (start..=end)
            .all(|i| self.surface.line(i).is_some_and(|line| line.kind == target));
        let kind = if all_target { LineKind::Paragraph } else { target };
        for line in start..=end {
            self.surface.set_line_kind(line, kind)?;
        }
        self.commit();
        Ok(true)
    }

    fn commit(&mut self) {
        self.document = self.surface.read_document();
        self.markdown = serialize(&self.document);
        self.stats = ContentStats::measure(&self.document, self.config.max_length);
        if self.stats.over_limit {
            tracing::debug!(
                chars = self.stats.chars,
                max = self.config.max_length,
                "content over advisory limit"
            );
        }
        if let Some(callback) = self.on_change.as_mut() {
            callback(&self.markdown);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::MemorySurface;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn session(markdown: &str) -> (EditorSession<MemorySurface>, Rc<RefCell<Vec<String>>>) {
        let mut session = EditorSession::new(MemorySurface::new(), EditorConfig::default());
        session.set_content(markdown).unwrap();
        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = changes.clone();
        session.set_on_change(move |md| sink.borrow_mut().push(md.to_string()));
        (session, changes)
    }

    fn caret_at_end(session: &mut EditorSession<MemorySurface>) {
        let end = session.surface().end_position();
        session
            .surface_mut()
            .set_selection(TextRange::caret(end))
            .unwrap();
    }

    fn type_text(session: &mut EditorSession<MemorySurface>, text: &str) {
        session.surface_mut().type_text(text).unwrap();
        session.content_changed();
    }

    #[test]
    fn test_set_content_does_not_notify() {
        let (session, changes) = session("1. a\n5. b");
        assert_eq!(session.get_markdown(), "1. a\n2. b");
        assert!(changes.borrow().is_empty());
    }

    #[test]
    fn test_typing_commits() {
        let (mut session, changes) = session("Dear");
        caret_at_end(&mut session);
        type_text(&mut session, " diary");
        assert_eq!(session.get_markdown(), "Dear diary");
        assert_eq!(session.stats().chars, 10);
        assert_eq!(*changes.borrow(), vec!["Dear diary".to_string()]);
    }

    #[test]
    fn test_composition_suppresses_changes() {
        let (mut session, changes) = session("");
        caret_at_end(&mut session);
        session.composition_start();
        session.composition_start();
        for text in ["に", "ほ", "ん"] {
            type_text(&mut session, text);
        }
        assert!(changes.borrow().is_empty());
        assert_eq!(session.get_markdown(), "");

        assert!(session.composition_end());
        assert!(!session.composition_end());
        assert_eq!(*changes.borrow(), vec!["にほん".to_string()]);
    }

    #[test]
    fn test_paste_is_plain_text_only() {
        let (mut session, _) = session("x");
        caret_at_end(&mut session);
        let data = ClipboardData {
            plain: Some(" <b>y</b>".to_string()),
            html: Some("<b>y</b>".to_string()),
        };
        assert!(session.paste(&data).unwrap());
        assert_eq!(session.get_markdown(), "x <b>y</b>");
        assert_eq!(
            session.document().nodes,
            vec![crate::tree::RichNode::Paragraph(vec![
                crate::tree::RichNode::text("x <b>y</b>")
            ])]
        );

        let html_only = ClipboardData {
            plain: None,
            html: Some("<i>z</i>".to_string()),
        };
        assert!(!session.paste(&html_only).unwrap());
    }

    #[test]
    fn test_no_selection_is_neutral() {
        let (mut session, changes) = session("text");
        assert!(!session.toggle_format(InlineFormat::Bold).unwrap());
        assert!(!session.apply_shorthand().unwrap());
        assert!(!session.paste(&ClipboardData::plain("p")).unwrap());
        assert_eq!(
            session.handle_enter(Modifiers::NONE).unwrap(),
            KeyResult::PassThrough
        );
        assert!(changes.borrow().is_empty());
    }

    #[test]
    fn test_lost_selection_is_neutral() {
        let (mut session, changes) = session("- item");
        caret_at_end(&mut session);
        session.surface_mut().clear_selection();
        assert!(!session.toggle_format(InlineFormat::Italic).unwrap());
        assert!(!session.paste(&ClipboardData::plain("p")).unwrap());
        assert_eq!(
            session.handle_enter(Modifiers::NONE).unwrap(),
            KeyResult::PassThrough
        );
        assert_eq!(session.get_markdown(), "- item");
        assert!(changes.borrow().is_empty());
    }

    #[test]
    fn test_commands_refused_while_composing() {
        let (mut session, changes) = session("note **x**");
        caret_at_end(&mut session);
        session.composition_start();

        assert!(!session.paste(&ClipboardData::plain(" pasted")).unwrap());
        assert!(!session.apply_shorthand().unwrap());
        session
            .surface_mut()
            .set_selection(TextRange::in_line(0, 0, 4))
            .unwrap();
        assert!(!session.toggle_format(InlineFormat::Bold).unwrap());
        assert_eq!(session.surface().line(0).unwrap().text, "note x");
        assert!(changes.borrow().is_empty());

        assert!(session.composition_end());
        session
            .surface_mut()
            .set_selection(TextRange::in_line(0, 0, 6))
            .unwrap();
        assert!(session.toggle_format(InlineFormat::Bold).unwrap());
        assert_eq!(session.get_markdown(), "**note x**");
    }

    #[test]
    fn test_bold_then_italic_survives_reload() {
        let (mut session, _) = session("word");
        let word = TextRange::in_line(0, 0, 4);
        session.surface_mut().set_selection(word).unwrap();
        assert!(session.toggle_format(InlineFormat::Bold).unwrap());
        session.surface_mut().set_selection(word).unwrap();
        assert!(session.toggle_format(InlineFormat::Italic).unwrap());
        assert_eq!(session.get_markdown(), "***word***");

        let saved = session.get_markdown().to_string();
        session.set_content(&saved).unwrap();
        assert_eq!(session.surface().line(0).unwrap().text, "word");
        assert_eq!(session.get_markdown(), "***word***");
    }

    #[test]
    fn test_live_shorthand() {
        let (mut session, _) = session("");
        caret_at_end(&mut session);
        type_text(&mut session, "so **happy**");
        assert_eq!(session.get_markdown(), "so **happy**");
        assert_eq!(session.surface().line(0).unwrap().text, "so happy");
        assert_eq!(
            session.surface().selection(),
            Some(TextRange::caret(TextPosition::new(0, 8)))
        );
    }

    #[test]
    fn test_shorthand_disabled() {
        let (mut session, _) = session("");
        session.set_config(EditorConfig {
            live_shorthand: false,
            ..EditorConfig::default()
        });
        caret_at_end(&mut session);
        type_text(&mut session, "a *b*");
        assert_eq!(session.surface().line(0).unwrap().text, "a *b*");
        // Toolbar italic on a collapsed caret still converts.
        assert!(session.toggle_format(InlineFormat::Italic).unwrap());
        assert_eq!(session.surface().line(0).unwrap().text, "a b");
        assert_eq!(session.get_markdown(), "a *b*");
    }

    #[test]
    fn test_toggle_format_selection() {
        let (mut session, changes) = session("one two");
        session
            .surface_mut()
            .set_selection(TextRange::in_line(0, 4, 7))
            .unwrap();
        assert!(session.toggle_format(InlineFormat::Italic).unwrap());
        assert_eq!(session.get_markdown(), "one *two*");
        assert_eq!(changes.borrow().len(), 1);
    }

    #[test]
    fn test_enter_continues_list() {
        let (mut session, _) = session("- a");
        caret_at_end(&mut session);
        assert_eq!(
            session.handle_enter(Modifiers::NONE).unwrap(),
            KeyResult::Handled
        );
        type_text(&mut session, "b");
        assert_eq!(session.get_markdown(), "- a\n- b");
    }

    #[test]
    fn test_enter_on_empty_item_exits_list() {
        let (mut session, _) = session("- a");
        caret_at_end(&mut session);
        session.handle_enter(Modifiers::NONE).unwrap();
        session.handle_enter(Modifiers::NONE).unwrap();
        assert_eq!(session.surface().line_count(), 2);
        assert_eq!(
            session.surface().line(1).map(|l| l.kind),
            Some(LineKind::Paragraph)
        );
        type_text(&mut session, "after");
        assert_eq!(session.get_markdown(), "- a\n\nafter");
    }

    #[test]
    fn test_modified_enter() {
        let (mut session, changes) = session("- a");
        caret_at_end(&mut session);
        assert_eq!(
            session.handle_enter(Modifiers::CTRL).unwrap(),
            KeyResult::PassThrough
        );
        assert_eq!(
            session.handle_enter(Modifiers::META).unwrap(),
            KeyResult::PassThrough
        );
        assert!(changes.borrow().is_empty());

        assert_eq!(
            session.handle_enter(Modifiers::SHIFT).unwrap(),
            KeyResult::Handled
        );
        type_text(&mut session, "b");
        assert_eq!(session.surface().line_count(), 1);
        assert_eq!(session.get_markdown(), "- a\nb");
    }

    #[test]
    fn test_shortcut_keys() {
        let (mut session, _) = session("word");
        session
            .surface_mut()
            .set_selection(TextRange::in_line(0, 0, 4))
            .unwrap();
        let result = session
            .handle_key(&Key::from_key_value("b"), Modifiers::CTRL)
            .unwrap();
        assert_eq!(result, KeyResult::Handled);
        assert_eq!(session.get_markdown(), "**word**");
        assert_eq!(
            session
                .handle_key(&Key::from_key_value("x"), Modifiers::CTRL)
                .unwrap(),
            KeyResult::PassThrough
        );
    }

    #[test]
    fn test_toggle_list() {
        let (mut session, _) = session("a\nb");
        session
            .surface_mut()
            .set_selection(TextRange::new(
                TextPosition::new(0, 0),
                TextPosition::new(1, 1),
            ))
            .unwrap();
        session
            .handle_action(EditorAction::ToggleList { ordered: true })
            .unwrap();
        assert_eq!(session.get_markdown(), "1. a\n2. b");
        session
            .handle_action(EditorAction::ToggleList { ordered: true })
            .unwrap();
        assert_eq!(session.get_markdown(), "a\n\nb");
    }

    #[test]
    fn test_stats_follow_commits() {
        let (mut session, _) = session("");
        assert!(session.stats().structurally_empty);
        session.set_config(EditorConfig {
            max_length: 3,
            ..EditorConfig::default()
        });
        caret_at_end(&mut session);
        type_text(&mut session, "abcd");
        let stats = session.stats();
        assert!(stats.over_limit);
        assert!(!stats.structurally_empty);
    }
}
