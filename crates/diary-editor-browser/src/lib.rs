//! Browser DOM layer for the diary editor.
//!
//! This crate implements the core `EditingSurface` over a `contenteditable`
//! element and extracts what the session needs from browser events. It
//! assumes a `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `dom`: line discovery and DOM point <-> `TextPosition` mapping
//! - `surface`: `BrowserSurface`, selection plus `execCommand` editing
//! - `events`: beforeinput, keydown and clipboard event extraction
//!
//! # Re-exports
//!
//! This crate re-exports `diary-editor-core` for convenience, so consumers
//! only need to depend on `diary-editor-browser`.

pub use diary_editor_core;
pub use diary_editor_core::*;

pub mod dom;
pub mod events;
pub mod surface;

pub use events::{clipboard_data, handle_beforeinput, parse_browser_input_type};
pub use surface::BrowserSurface;
