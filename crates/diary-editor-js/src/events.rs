//! Event handlers exposed to JavaScript.
//!
//! The host page forwards DOM events from the mounted element to these
//! handlers and calls `preventDefault` when they return `Handled`.

use wasm_bindgen::prelude::*;

use diary_editor_browser::{
    ClipboardData, Key, KeyResult, Modifiers, PlatformError, handle_beforeinput,
    parse_browser_input_type,
};

use crate::editor::JsEditor;

/// Result of handling an event.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Event was handled, call preventDefault.
    Handled,
    /// Event should pass through to browser.
    PassThrough,
}

impl From<KeyResult> for EventResult {
    fn from(r: KeyResult) -> Self {
        match r {
            KeyResult::Handled => EventResult::Handled,
            KeyResult::PassThrough => EventResult::PassThrough,
        }
    }
}

fn or_pass_through(result: Result<KeyResult, PlatformError>, event: &str) -> EventResult {
    match result {
        Ok(r) => r.into(),
        Err(err) => {
            tracing::warn!(%err, event, "handler failed, falling back to browser default");
            EventResult::PassThrough
        }
    }
}

#[wasm_bindgen]
impl JsEditor {
    // === Event handlers ===

    /// Handle beforeinput event.
    ///
    /// `data` is `InputEvent.data`, or the `text/plain` transfer for drops.
    #[wasm_bindgen(js_name = handleBeforeInput)]
    pub fn handle_before_input(
        &mut self,
        input_type: &str,
        data: Option<String>,
        html: Option<String>,
        is_composing: bool,
    ) -> EventResult {
        let Some(session) = &mut self.session else {
            return EventResult::PassThrough;
        };
        let input_type = parse_browser_input_type(input_type);
        let payload = ClipboardData { plain: data, html };
        let result = handle_beforeinput(session, &input_type, &payload, is_composing);
        if input_type.carries_markup() {
            // Never let the browser insert foreign markup, even on failure.
            if let Err(err) = result {
                tracing::warn!(%err, "paste failed");
            }
            return EventResult::Handled;
        }
        or_pass_through(result, "beforeinput")
    }

    /// Handle keydown event.
    #[wasm_bindgen(js_name = handleKeydown)]
    pub fn handle_keydown(
        &mut self,
        key: &str,
        ctrl: bool,
        alt: bool,
        shift: bool,
        meta: bool,
    ) -> EventResult {
        let Some(session) = &mut self.session else {
            return EventResult::PassThrough;
        };
        let modifiers = Modifiers {
            ctrl,
            alt,
            shift,
            meta,
        };
        let result = session.handle_key(&Key::from_key_value(key), modifiers);
        or_pass_through(result, "keydown")
    }

    /// Handle paste event with both clipboard flavours.
    ///
    /// Always handled: only the plain text is inserted.
    #[wasm_bindgen(js_name = handlePaste)]
    pub fn handle_paste(&mut self, plain: Option<String>, html: Option<String>) -> EventResult {
        if let Some(session) = &mut self.session {
            if let Err(err) = session.paste(&ClipboardData { plain, html }) {
                tracing::warn!(%err, "paste failed");
            }
        }
        EventResult::Handled
    }

    /// Handle input event: the browser changed the content natively.
    #[wasm_bindgen(js_name = handleInput)]
    pub fn handle_input(&mut self) {
        if let Some(session) = &mut self.session {
            session.content_changed();
        }
    }

    #[wasm_bindgen(js_name = handleCompositionStart)]
    pub fn handle_composition_start(&mut self) {
        if let Some(session) = &mut self.session {
            session.composition_start();
        }
    }

    #[wasm_bindgen(js_name = handleCompositionEnd)]
    pub fn handle_composition_end(&mut self) {
        if let Some(session) = &mut self.session {
            session.composition_end();
        }
    }
}
