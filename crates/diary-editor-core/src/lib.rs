//! diary-editor-core: Markdown <-> rich tree conversion and editing logic,
//! without framework dependencies.
//!
//! This crate provides:
//! - `compile` / `serialize` - the diary Markdown dialect to and from `RichDocument`
//! - `sanitize`, `to_html`, `parse_html` - the HTML boundary
//! - `EditorSession<S>` - live editing state machine, generic over `EditingSurface`
//! - `MemorySurface` - headless surface for tests and non-browser hosts
//! - `PlainEditor<T>` - list continuation for a plain Markdown textarea

pub mod actions;
pub mod compile;
pub mod config;
pub mod content;
pub mod html;
pub mod inline;
pub mod plain;
pub mod platform;
pub mod sanitize;
pub mod serialize;
pub mod session;
pub mod shorthand;
pub mod surface;
pub mod text;
pub mod text_helpers;
pub mod tree;
pub mod types;

pub use actions::{EditorAction, InputType, Key, KeyResult, Modifiers, action_for_shortcut};
pub use compile::compile;
pub use config::{ConfigError, EditorConfig};
pub use content::{ContentStats, MAX_CONTENT_LENGTH, is_structurally_empty, text_length};
pub use html::{parse_html, to_html};
pub use plain::PlainEditor;
pub use platform::{ClipboardData, EditingSurface, PlatformError};
pub use sanitize::sanitize;
pub use serialize::serialize;
pub use session::EditorSession;
pub use smol_str::SmolStr;
pub use surface::MemorySurface;
pub use text::{EditorRope, TextBuffer};
pub use tree::{RichDocument, RichNode};
pub use types::{CompositionState, InlineFormat, LineInfo, LineKind, TextPosition, TextRange};
