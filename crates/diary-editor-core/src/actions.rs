//! Editor actions and input types.
//!
//! `InputType` is the semantic intent of a platform input event (browser
//! `beforeinput` and friends). `EditorAction` is what the session actually
//! performs. Platform adapters translate the former into the latter.

use smol_str::SmolStr;

use crate::types::InlineFormat;

/// Semantic input types from input events.
///
/// The subset of the W3C Input Events vocabulary this editor reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputType {
    /// Insert typed text.
    InsertText,
    /// Insert text from IME composition.
    InsertCompositionText,
    /// Insert a line break (Shift+Enter).
    InsertLineBreak,
    /// Insert a paragraph break (Enter).
    InsertParagraph,
    /// Insert from paste operation.
    InsertFromPaste,
    /// Insert from drop operation.
    InsertFromDrop,
    /// Spell check correction and similar.
    InsertReplacementText,
    InsertOrderedList,
    InsertUnorderedList,

    DeleteContentBackward,
    DeleteContentForward,
    DeleteWordBackward,
    DeleteWordForward,
    DeleteByCut,
    DeleteContent,

    HistoryUndo,
    HistoryRedo,

    FormatBold,
    FormatItalic,

    /// Unrecognized input type.
    Unknown(String),
}

impl InputType {
    /// Parse a `beforeinput` `inputType` string.
    pub fn parse(s: &str) -> Self {
        match s {
            "insertText" => Self::InsertText,
            "insertCompositionText" => Self::InsertCompositionText,
            "insertLineBreak" => Self::InsertLineBreak,
            "insertParagraph" => Self::InsertParagraph,
            "insertFromPaste" | "insertFromPasteAsQuotation" => Self::InsertFromPaste,
            "insertFromDrop" => Self::InsertFromDrop,
            "insertReplacementText" => Self::InsertReplacementText,
            "insertOrderedList" => Self::InsertOrderedList,
            "insertUnorderedList" => Self::InsertUnorderedList,
            "deleteContentBackward" => Self::DeleteContentBackward,
            "deleteContentForward" => Self::DeleteContentForward,
            "deleteWordBackward" => Self::DeleteWordBackward,
            "deleteWordForward" => Self::DeleteWordForward,
            "deleteByCut" => Self::DeleteByCut,
            "deleteContent" => Self::DeleteContent,
            "historyUndo" => Self::HistoryUndo,
            "historyRedo" => Self::HistoryRedo,
            "formatBold" => Self::FormatBold,
            "formatItalic" => Self::FormatItalic,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Whether this input type is a deletion operation.
    pub fn is_deletion(&self) -> bool {
        matches!(
            self,
            Self::DeleteContentBackward
                | Self::DeleteContentForward
                | Self::DeleteWordBackward
                | Self::DeleteWordForward
                | Self::DeleteByCut
                | Self::DeleteContent
        )
    }

    /// Inputs that would carry foreign markup into the surface.
    pub fn carries_markup(&self) -> bool {
        matches!(self, Self::InsertFromPaste | Self::InsertFromDrop)
    }
}

/// Semantic operations the session performs, however they were triggered.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorAction {
    /// Insert text at the caret, replacing any selection.
    Insert { text: String },
    /// Soft line break inside the current paragraph or item.
    InsertLineBreak,
    /// Enter: split the line, continue or exit a list.
    InsertParagraph,
    ToggleFormat(InlineFormat),
    /// Turn the current line into a list item, or back into a paragraph.
    ToggleList { ordered: bool },
    /// Paste a plain-text payload.
    Paste { text: String },
}

/// Key values the session inspects. Everything else is `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Character(SmolStr),
    Enter,
    Other,
}

impl Key {
    /// Convert a DOM `KeyboardEvent.key` value.
    pub fn from_key_value(value: &str) -> Self {
        match value {
            "Enter" => Self::Enter,
            s if s.chars().count() == 1 => Self::Character(SmolStr::new(s)),
            _ => Self::Other,
        }
    }
}

/// Modifier key state for a key combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    pub const META: Self = Self {
        meta: true,
        ..Self::NONE
    };

    /// Ctrl on most platforms, Cmd on Mac. Either counts.
    pub fn primary(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Result of handling a key or input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResult {
    /// Event was handled, prevent default.
    Handled,
    /// Not ours, let the platform handle it.
    PassThrough,
}

/// Map a keyboard shortcut to an action.
pub fn action_for_shortcut(key: &Key, modifiers: Modifiers) -> Option<EditorAction> {
    if !modifiers.primary() || modifiers.alt {
        return None;
    }
    let Key::Character(c) = key else {
        return None;
    };
    match c.to_ascii_lowercase().as_str() {
        "b" => Some(EditorAction::ToggleFormat(InlineFormat::Bold)),
        "i" => Some(EditorAction::ToggleFormat(InlineFormat::Italic)),
        _ => None,
    }
}
