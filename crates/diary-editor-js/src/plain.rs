//! Helpers for the plain Markdown textarea and for pre-save checks.
//!
//! Textarea offsets are UTF-16 code units; the core counts chars.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use diary_editor_browser::{
    ContentStats, EditorConfig, KeyResult, Modifiers, PlainEditor, compile, serialize,
};

/// Result of a handled Enter in the textarea.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextareaEdit {
    pub text: String,
    /// Caret in UTF-16 code units.
    pub cursor: usize,
}

fn utf16_to_chars(text: &str, units: usize) -> usize {
    let mut seen = 0;
    for (i, c) in text.chars().enumerate() {
        if seen >= units {
            return i;
        }
        seen += c.len_utf16();
    }
    text.chars().count()
}

fn chars_to_utf16(text: &str, chars: usize) -> usize {
    text.chars().take(chars).map(char::len_utf16).sum()
}

/// Enter in the plain textarea: continue or leave a Markdown list.
///
/// Returns `None` when the textarea should insert its own newline.
pub fn continue_list_edit(
    text: &str,
    cursor: usize,
    modifiers: Modifiers,
) -> Option<TextareaEdit> {
    let mut editor = PlainEditor::from_markdown(text);
    editor.set_cursor(utf16_to_chars(text, cursor));
    if editor.handle_enter(modifiers) == KeyResult::PassThrough {
        return None;
    }
    let text = editor.content();
    let cursor = chars_to_utf16(&text, editor.cursor());
    Some(TextareaEdit { text, cursor })
}

/// `continue_list_edit` for JavaScript: `{ text, cursor }` or `null`.
#[wasm_bindgen(js_name = continueList)]
pub fn continue_list(
    text: &str,
    cursor: usize,
    shift: bool,
    ctrl: bool,
    meta: bool,
) -> Result<JsValue, JsError> {
    let modifiers = Modifiers {
        ctrl,
        alt: false,
        shift,
        meta,
    };
    match continue_list_edit(text, cursor, modifiers) {
        Some(edit) => serde_wasm_bindgen::to_value(&edit)
            .map_err(|e| JsError::new(&format!("Serialization error: {}", e))),
        None => Ok(JsValue::NULL),
    }
}

/// Length and emptiness of a Markdown entry, for checks outside the editor.
#[wasm_bindgen(js_name = measureMarkdown)]
pub fn measure_markdown(markdown: &str, max_length: Option<usize>) -> Result<JsValue, JsError> {
    let max_length = max_length.unwrap_or(EditorConfig::default().max_length);
    let stats = ContentStats::measure(&compile(markdown), max_length);
    serde_wasm_bindgen::to_value(&stats)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

/// Canonical form of a Markdown entry: what the editor would save for it.
#[wasm_bindgen(js_name = normalizeMarkdown)]
pub fn normalize_markdown(markdown: &str) -> String {
    serialize(&compile(markdown))
}
