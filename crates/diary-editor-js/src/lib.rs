//! WASM bindings for the diary rich-text editor.
//!
//! Provides the embeddable editor for the journal page: a `contenteditable`
//! surface that reads and writes the diary Markdown dialect, plus helpers for
//! the plain Markdown textarea and for length checks before saving.

mod editor;
mod events;
mod plain;

pub use editor::*;
pub use events::*;
pub use plain::*;

use wasm_bindgen::prelude::*;

/// Initialize panic hook and console logging.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    use tracing::Level;
    use tracing::subscriber::set_global_default;
    use tracing_subscriber::Registry;
    use tracing_subscriber::layer::SubscriberExt;

    let console_level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let wasm_layer = tracing_wasm::WASMLayer::new(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(console_level)
            .build(),
    );

    // A host page may load the module twice; the first subscriber wins.
    let _ = set_global_default(Registry::default().with(wasm_layer));
}
