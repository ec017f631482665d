//! `HostBridge` for a content script.
//!
//! Reports go to a registered JS callback when there is one, otherwise they
//! are posted to the window so the extension's own listener can pick them up.

use std::cell::RefCell;

use factmark_core::{HostBridge, PageInfo, ReportRequest};
use serde::Serialize;
use wasm_bindgen::JsValue;
use web_sys::Window;

/// `type` field of report messages posted to the window.
pub const REPORT_MESSAGE_TYPE: &str = "factmark:report";

#[derive(Serialize)]
struct ReportMessage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(flatten)]
    request: &'a ReportRequest,
}

pub struct BrowserHost {
    window: Window,
    on_report: RefCell<Option<js_sys::Function>>,
}

impl BrowserHost {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            on_report: RefCell::new(None),
        }
    }

    /// Callback signature: `(request: { url, title, issue }) => void`
    pub fn set_report_callback(&self, callback: Option<js_sys::Function>) {
        *self.on_report.borrow_mut() = callback;
    }

    fn deliver(&self, request: &ReportRequest) -> Result<(), JsValue> {
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        let callback = self.on_report.borrow().clone();
        match callback {
            Some(callback) => {
                let value = request.serialize(&serializer)?;
                callback.call1(&JsValue::NULL, &value)?;
            }
            None => {
                let message = ReportMessage {
                    kind: REPORT_MESSAGE_TYPE,
                    request,
                }
                .serialize(&serializer)?;
                self.window.post_message(&message, "*")?;
            }
        }
        Ok(())
    }
}

impl HostBridge for BrowserHost {
    fn page_info(&self) -> PageInfo {
        let url = self.window.location().href().unwrap_or_default();
        let title = self
            .window
            .document()
            .map(|d| d.title())
            .unwrap_or_default();
        PageInfo { url, title }
    }

    fn submit_report(&self, request: ReportRequest) {
        if let Err(e) = self.deliver(&request) {
            tracing::warn!(target: "factmark::host", error = ?e, "report hand-off failed");
        }
    }

    fn show_dialog(&self, message: &str) {
        if let Err(e) = self.window.alert_with_message(message) {
            tracing::warn!(target: "factmark::host", error = ?e, "dialog failed");
        }
    }
}
