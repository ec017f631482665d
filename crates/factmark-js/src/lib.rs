//! WASM bindings for the factmark annotation engine.
//!
//! Provides the `JsAnnotator` entry point for the extension's content
//! script: annotate a batch of flagged claims, react to report clicks,
//! and revert the page.

mod annotator;
mod types;

pub use annotator::*;
pub use types::*;

use wasm_bindgen::prelude::*;

/// Initialize panic hook and console tracing.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    init_tracing();
}

#[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
fn init_tracing() {
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

    // The host page may have installed a subscriber already.
    let _ = set_global_default(Registry::default().with(wasm_layer));
}

#[cfg(not(all(target_arch = "wasm32", target_os = "unknown")))]
fn init_tracing() {}
