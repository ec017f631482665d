//! Browser layer for the factmark annotation engine.
//!
//! This crate implements the core platform traits on top of `web-sys` and
//! owns the session on behalf of the content script. It assumes a
//! `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `dom`: `BrowserDom`, the live document behind `AnnotationDom`
//! - `timers`: `BrowserTimers`, `setTimeout` via `gloo-timers`
//! - `host`: `BrowserHost`, report hand-off and dialogs
//! - `dispatch`: routes listener and timer callbacks back into the session
//! - `annotator`: `BrowserAnnotator`, the `Rc<RefCell<..>>` owner of a session
//!
//! # Re-exports
//!
//! This crate re-exports `factmark-core` for convenience, so consumers
//! only need to depend on `factmark-browser`.

// Re-export core crate
pub use factmark_core;
pub use factmark_core::*;

pub mod annotator;
pub mod dispatch;
pub mod dom;
pub mod host;
pub mod timers;

pub use annotator::{BrowserAnnotator, BrowserSession};
pub use dispatch::Dispatcher;
pub use dom::BrowserDom;
pub use host::{BrowserHost, REPORT_MESSAGE_TYPE};
pub use timers::BrowserTimers;
