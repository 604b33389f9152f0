//! Browser event handling for the editor.
//!
//! Extracts what the session needs from `beforeinput`, `keydown` and
//! clipboard events, and routes `beforeinput` intents to the session.

use diary_editor_core::{
    ClipboardData, EditingSurface, EditorAction, EditorSession, InlineFormat, InputType, Key,
    KeyResult, Modifiers, PlatformError,
};

/// Parse a browser inputType string to an InputType enum.
pub fn parse_browser_input_type(s: &str) -> InputType {
    InputType::parse(s)
}

/// Get input type from a beforeinput event.
pub fn get_input_type_from_event(event: &web_sys::InputEvent) -> InputType {
    parse_browser_input_type(&event.input_type())
}

/// Check if the beforeinput event is during IME composition.
pub fn is_composing(event: &web_sys::InputEvent) -> bool {
    event.is_composing()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn read_transfer(transfer: Option<web_sys::DataTransfer>) -> ClipboardData {
    let Some(transfer) = transfer else {
        return ClipboardData::default();
    };
    ClipboardData {
        plain: non_empty(transfer.get_data("text/plain").ok()),
        html: non_empty(transfer.get_data("text/html").ok()),
    }
}

/// Get data from a beforeinput event, handling different sources.
///
/// `data` covers typed text; paste and drop carry theirs in `dataTransfer`.
pub fn get_data_from_event(event: &web_sys::InputEvent) -> ClipboardData {
    if let Some(data) = non_empty(event.data()) {
        return ClipboardData::plain(data);
    }
    read_transfer(event.data_transfer())
}

/// Read a paste event's payload.
pub fn clipboard_data(event: &web_sys::ClipboardEvent) -> ClipboardData {
    read_transfer(event.clipboard_data())
}

pub fn modifiers_from_event(event: &web_sys::KeyboardEvent) -> Modifiers {
    Modifiers {
        ctrl: event.ctrl_key(),
        alt: event.alt_key(),
        shift: event.shift_key(),
        meta: event.meta_key(),
    }
}

pub fn key_from_event(event: &web_sys::KeyboardEvent) -> Key {
    Key::from_key_value(&event.key())
}

/// Route a `beforeinput` intent.
///
/// Plain typing, deletion and history pass through to the browser; the host
/// reports the resulting `input` event via `content_changed`. Paste and drop
/// are always handled so that foreign markup never reaches the DOM.
pub fn handle_beforeinput<S: EditingSurface>(
    session: &mut EditorSession<S>,
    input_type: &InputType,
    data: &ClipboardData,
    is_composing: bool,
) -> Result<KeyResult, PlatformError> {
    tracing::trace!(?input_type, is_composing, "beforeinput");
    if is_composing || session.is_composing() {
        return Ok(KeyResult::PassThrough);
    }

    match input_type {
        InputType::InsertParagraph => session.handle_enter(Modifiers::NONE),
        InputType::InsertLineBreak => session.handle_enter(Modifiers::SHIFT),
        t if t.carries_markup() => {
            session.paste(data)?;
            Ok(KeyResult::Handled)
        }
        InputType::FormatBold => session.handle_action(EditorAction::ToggleFormat(InlineFormat::Bold)),
        InputType::FormatItalic => {
            session.handle_action(EditorAction::ToggleFormat(InlineFormat::Italic))
        }
        InputType::InsertOrderedList => {
            session.handle_action(EditorAction::ToggleList { ordered: true })
        }
        InputType::InsertUnorderedList => {
            session.handle_action(EditorAction::ToggleList { ordered: false })
        }
        _ => Ok(KeyResult::PassThrough),
    }
}
