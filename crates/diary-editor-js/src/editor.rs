//! JsEditor - the rich diary editor wrapper for JavaScript.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use diary_editor_browser::{
    BrowserSurface, ContentStats, EditorAction, EditorConfig, EditorSession, InlineFormat,
    KeyResult, compile,
};

pub(crate) type Session = EditorSession<BrowserSurface>;

/// The rich editor instance exposed to JavaScript.
///
/// Before `mount` and after `unmount` the editor only holds Markdown; the
/// session and its DOM surface exist while mounted.
#[wasm_bindgen]
pub struct JsEditor {
    config: EditorConfig,
    /// Content while unmounted.
    detached: String,
    pub(crate) session: Option<Session>,
    on_change: Option<js_sys::Function>,
}

fn parse_config(config: JsValue) -> Result<EditorConfig, JsError> {
    if config.is_undefined() || config.is_null() {
        return Ok(EditorConfig::default());
    }
    let config: EditorConfig = serde_wasm_bindgen::from_value(config)
        .map_err(|e| JsError::new(&format!("Invalid config: {}", e)))?;
    config
        .validate()
        .map_err(|e| JsError::new(&e.to_string()))?;
    Ok(config)
}

fn install_callback(session: &mut Session, callback: Option<js_sys::Function>) {
    match callback {
        Some(callback) => session.set_on_change(move |markdown| {
            if let Err(err) = callback.call1(&JsValue::NULL, &JsValue::from_str(markdown)) {
                tracing::warn!(?err, "onChange callback threw");
            }
        }),
        None => session.clear_on_change(),
    }
}

#[wasm_bindgen]
impl JsEditor {
    /// Create an editor. `config` may be omitted; missing fields take defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsEditor, JsError> {
        Ok(Self {
            config: parse_config(config)?,
            detached: String::new(),
            session: None,
            on_change: None,
        })
    }

    /// Create an editor holding `content`, with default settings.
    #[wasm_bindgen(js_name = fromMarkdown)]
    pub fn from_markdown(content: &str) -> Self {
        Self {
            config: EditorConfig::default(),
            detached: content.to_string(),
            session: None,
            on_change: None,
        }
    }

    // === Content access ===

    /// Get the Markdown of the last committed content.
    #[wasm_bindgen(js_name = getMarkdown)]
    pub fn get_markdown(&self) -> String {
        match &self.session {
            Some(session) => session.get_markdown().to_string(),
            None => self.detached.clone(),
        }
    }

    /// Replace the content. Does not fire onChange.
    #[wasm_bindgen(js_name = setContent)]
    pub fn set_content(&mut self, markdown: &str) -> Result<(), JsError> {
        match &mut self.session {
            Some(session) => session
                .set_content(markdown)
                .map_err(|e| JsError::new(&e.to_string())),
            None => {
                self.detached = markdown.to_string();
                Ok(())
            }
        }
    }

    /// Register the change callback, called with the new Markdown.
    #[wasm_bindgen(js_name = setOnChange)]
    pub fn set_on_change(&mut self, callback: Option<js_sys::Function>) {
        self.on_change = callback.clone();
        if let Some(session) = &mut self.session {
            install_callback(session, callback);
        }
    }

    // === Length and emptiness ===

    /// `{ chars, structurallyEmpty, overLimit }` for the current content.
    #[wasm_bindgen(js_name = getStats)]
    pub fn get_stats(&self) -> Result<JsValue, JsError> {
        serde_wasm_bindgen::to_value(&self.stats())
            .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
    }

    #[wasm_bindgen(js_name = charCount)]
    pub fn char_count(&self) -> usize {
        self.stats().chars
    }

    #[wasm_bindgen(js_name = isOverLimit)]
    pub fn is_over_limit(&self) -> bool {
        self.stats().over_limit
    }

    #[wasm_bindgen(js_name = isEmpty)]
    pub fn is_empty(&self) -> bool {
        self.stats().structurally_empty
    }

    // === Mounting ===

    /// Create the `contenteditable` element inside `container` and load the
    /// current content into it.
    #[wasm_bindgen]
    pub fn mount(
        &mut self,
        container: &HtmlElement,
        on_change: Option<js_sys::Function>,
    ) -> Result<(), JsError> {
        if self.session.is_some() {
            self.unmount();
        }
        let window = web_sys::window().ok_or_else(|| JsError::new("No window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsError::new("No document"))?;

        let editor_id = format!("diary-editor-{}", js_sys::Math::random().to_bits());
        let editor_el: HtmlElement = document
            .create_element("div")
            .map_err(|e| JsError::new(&format!("Failed to create element: {:?}", e)))?
            .dyn_into()
            .map_err(|_| JsError::new("Created element is not an HtmlElement"))?;

        for (name, value) in [
            ("id", editor_id.as_str()),
            ("contenteditable", "true"),
            ("class", "diary-editor-content"),
            ("role", "textbox"),
            ("aria-multiline", "true"),
        ] {
            editor_el
                .set_attribute(name, value)
                .map_err(|e| JsError::new(&format!("Failed to set {}: {:?}", name, e)))?;
        }
        container
            .append_child(&editor_el)
            .map_err(|e| JsError::new(&format!("Failed to append child: {:?}", e)))?;

        let surface = BrowserSurface::new(editor_el).map_err(|e| JsError::new(&e.to_string()))?;
        let mut session = EditorSession::new(surface, self.config.clone());
        session
            .set_content(&self.detached)
            .map_err(|e| JsError::new(&e.to_string()))?;

        if on_change.is_some() {
            self.on_change = on_change;
        }
        install_callback(&mut session, self.on_change.clone());
        self.session = Some(session);
        tracing::debug!(%editor_id, "editor mounted");
        Ok(())
    }

    #[wasm_bindgen(js_name = isMounted)]
    pub fn is_mounted(&self) -> bool {
        self.session.is_some()
    }

    /// Remove the editor element. The content is kept.
    #[wasm_bindgen]
    pub fn unmount(&mut self) {
        if let Some(session) = self.session.take() {
            self.detached = session.get_markdown().to_string();
            session.surface().root().remove();
        }
    }

    /// Focus the editor.
    #[wasm_bindgen]
    pub fn focus(&self) {
        if let Some(session) = &self.session {
            let _ = session.surface().root().focus();
        }
    }

    // === Formatting commands ===

    #[wasm_bindgen(js_name = toggleBold)]
    pub fn toggle_bold(&mut self) -> bool {
        self.run_action(EditorAction::ToggleFormat(InlineFormat::Bold))
    }

    #[wasm_bindgen(js_name = toggleItalic)]
    pub fn toggle_italic(&mut self) -> bool {
        self.run_action(EditorAction::ToggleFormat(InlineFormat::Italic))
    }

    #[wasm_bindgen(js_name = toggleBulletList)]
    pub fn toggle_bullet_list(&mut self) -> bool {
        self.run_action(EditorAction::ToggleList { ordered: false })
    }

    #[wasm_bindgen(js_name = toggleNumberedList)]
    pub fn toggle_numbered_list(&mut self) -> bool {
        self.run_action(EditorAction::ToggleList { ordered: true })
    }
}

impl JsEditor {
    pub(crate) fn stats(&self) -> ContentStats {
        match &self.session {
            Some(session) => session.stats(),
            None => ContentStats::measure(&compile(&self.detached), self.config.max_length),
        }
    }

    fn run_action(&mut self, action: EditorAction) -> bool {
        let Some(session) = &mut self.session else {
            return false;
        };
        match session.handle_action(action) {
            Ok(result) => result == KeyResult::Handled,
            Err(err) => {
                tracing::warn!(%err, "editor command failed");
                false
            }
        }
    }
}
