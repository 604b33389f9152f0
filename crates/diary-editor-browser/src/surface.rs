//! `contenteditable` implementation of [`EditingSurface`].
//!
//! Edits go through `document.execCommand` so they land on the browser's own
//! undo stack. Reads go through the DOM and the core HTML parser, which means
//! whatever markup the browser produced is normalized on the way out.

use diary_editor_core::{
    EditingSurface, InlineFormat, LineInfo, LineKind, PlatformError, RichDocument, TextPosition,
    TextRange, parse_html, sanitize, to_html,
};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{HtmlDocument, HtmlElement, Node, Selection};

use crate::dom::{DomLine, collect_lines, dom_point, position_of};

const EMPTY_LINE_HTML: &str = "<p><br></p>";

fn js_err(context: &str, err: JsValue) -> PlatformError {
    PlatformError::Platform(format!("{context}: {err:?}"))
}

/// An editable element plus the document that owns it.
pub struct BrowserSurface {
    root: HtmlElement,
    document: HtmlDocument,
}

impl BrowserSurface {
    /// Wrap an element. The element should already be `contenteditable`.
    pub fn new(root: HtmlElement) -> Result<Self, PlatformError> {
        let document = root
            .owner_document()
            .ok_or("editor element has no owner document")?
            .dyn_into::<HtmlDocument>()
            .map_err(|_| "editor element is not in an HTML document")?;

        // Enter in a bare contenteditable makes <div>s in some engines.
        if let Err(err) =
            document.exec_command_with_show_ui_and_value("defaultParagraphSeparator", false, "p")
        {
            tracing::debug!(?err, "defaultParagraphSeparator not supported");
        }
        Ok(Self { root, document })
    }

    pub fn root(&self) -> &HtmlElement {
        &self.root
    }

    fn lines(&self) -> Vec<DomLine> {
        collect_lines(&self.root)
    }

    fn dom_selection(&self) -> Option<Selection> {
        self.document.get_selection().ok().flatten()
    }

    fn point(&self, lines: &[DomLine], pos: TextPosition) -> Result<(Node, u32), PlatformError> {
        match lines.get(pos.line) {
            Some(line) => {
                let len = line.len();
                if pos.offset > len {
                    return Err(PlatformError::OutOfRange {
                        line: pos.line,
                        offset: pos.offset,
                    });
                }
                Ok(dom_point(&line.element, pos.offset))
            }
            // An element with no lines yet still takes a caret at its start.
            None if lines.is_empty() && pos == TextPosition::default() => {
                Ok((self.root.clone().into(), 0))
            }
            None => Err(PlatformError::NoSuchLine(pos.line)),
        }
    }

    fn exec(&self, command: &str, value: &str) -> Result<(), PlatformError> {
        if let Err(err) = self.root.focus() {
            tracing::debug!(?err, "focus before execCommand failed");
        }
        let accepted = self
            .document
            .exec_command_with_show_ui_and_value(command, false, value)
            .map_err(|err| js_err(command, err))?;
        tracing::trace!(command, accepted, "execCommand");
        if accepted {
            Ok(())
        } else {
            Err(PlatformError::Platform(format!(
                "execCommand {command} was rejected"
            )))
        }
    }

    fn caret_after_edit(&self) -> Result<TextPosition, PlatformError> {
        self.selection()
            .map(|range| range.head)
            .ok_or_else(|| PlatformError::from("selection lost after edit"))
    }
}

impl EditingSurface for BrowserSurface {
    fn selection(&self) -> Option<TextRange> {
        let selection = self.dom_selection()?;
        let anchor_node = selection.anchor_node()?;
        let focus_node = selection.focus_node()?;
        let root: &Node = self.root.as_ref();
        if !root.contains(Some(&anchor_node)) || !root.contains(Some(&focus_node)) {
            return None;
        }

        tracing::trace!(
            anchor_node_name = %anchor_node.node_name(),
            anchor_offset = selection.anchor_offset(),
            focus_node_name = %focus_node.node_name(),
            focus_offset = selection.focus_offset(),
            "browser selection state"
        );

        let lines = self.lines();
        if lines.is_empty() {
            return Some(TextRange::caret(TextPosition::default()));
        }
        let anchor = position_of(&lines, &anchor_node, selection.anchor_offset());
        let head = position_of(&lines, &focus_node, selection.focus_offset());
        match (anchor, head) {
            (Some(anchor), Some(head)) => Some(TextRange::new(anchor, head)),
            _ => {
                tracing::warn!("could not map DOM selection to line positions");
                None
            }
        }
    }

    fn set_selection(&mut self, range: TextRange) -> Result<(), PlatformError> {
        let lines = self.lines();
        let (anchor_node, anchor_offset) = self.point(&lines, range.anchor)?;
        let (focus_node, focus_offset) = self.point(&lines, range.head)?;
        let selection = self
            .dom_selection()
            .ok_or("document has no selection object")?;
        selection
            .set_base_and_extent(&anchor_node, anchor_offset, &focus_node, focus_offset)
            .map_err(|err| js_err("setBaseAndExtent", err))
    }

    fn line_count(&self) -> usize {
        self.lines().len()
    }

    fn line(&self, index: usize) -> Option<LineInfo> {
        self.lines().get(index).map(DomLine::info)
    }

    fn replace_range(&mut self, range: TextRange, text: &str) -> Result<TextPosition, PlatformError> {
        self.set_selection(range)?;
        if text.is_empty() {
            if !range.is_collapsed() {
                self.exec("delete", "")?;
            }
            return self.caret_after_edit();
        }
        for (i, segment) in text.split('\n').enumerate() {
            if i > 0 {
                self.exec("insertParagraph", "")?;
            }
            if !segment.is_empty() {
                self.exec("insertText", segment)?;
            }
        }
        self.caret_after_edit()
    }

    fn apply_inline_format(
        &mut self,
        range: TextRange,
        format: InlineFormat,
    ) -> Result<bool, PlatformError> {
        if range.is_collapsed() {
            return Ok(false);
        }
        self.set_selection(range)?;
        let command = match format {
            InlineFormat::Bold => "bold",
            InlineFormat::Italic => "italic",
        };
        self.exec(command, "")?;
        Ok(true)
    }

    fn split_line(&mut self, at: TextPosition) -> Result<TextPosition, PlatformError> {
        self.set_selection(TextRange::caret(at))?;
        self.exec("insertParagraph", "")?;
        self.caret_after_edit()
    }

    fn insert_line_break(&mut self, at: TextPosition) -> Result<TextPosition, PlatformError> {
        self.set_selection(TextRange::caret(at))?;
        self.exec("insertLineBreak", "")?;
        self.caret_after_edit()
    }

    fn set_line_kind(&mut self, line: usize, kind: LineKind) -> Result<(), PlatformError> {
        let lines = self.lines();
        let current = lines
            .get(line)
            .ok_or(PlatformError::NoSuchLine(line))?
            .kind;
        if current == kind {
            return Ok(());
        }
        // The list commands toggle, so leaving a list reissues its own command.
        let command = match (current, kind) {
            (LineKind::Numbered, LineKind::Paragraph) | (_, LineKind::Numbered) => {
                "insertOrderedList"
            }
            (LineKind::Bullet, LineKind::Paragraph) | (_, LineKind::Bullet) => {
                "insertUnorderedList"
            }
            (LineKind::Paragraph, LineKind::Paragraph) => return Ok(()),
        };
        self.set_selection(TextRange::caret(TextPosition::new(line, 0)))?;
        self.exec(command, "")
    }

    fn read_document(&self) -> RichDocument {
        parse_html(&self.root.inner_html())
    }

    fn render(&mut self, document: &RichDocument) -> Result<(), PlatformError> {
        let html = to_html(document);
        let html = if html.is_empty() {
            EMPTY_LINE_HTML.to_string()
        } else {
            sanitize(&html)
        };
        self.root.set_inner_html(&html);
        tracing::debug!(blocks = document.nodes.len(), "rendered document");
        Ok(())
    }
}
