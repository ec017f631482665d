//! JsAnnotator - the annotation entry point for JavaScript.

use factmark_browser::BrowserAnnotator;
use factmark_core::{AnnotatorConfig, Issue};
use wasm_bindgen::prelude::*;

use crate::types::{JsIssue, JsReport};

fn parse_issues(issues: JsValue) -> Result<Vec<Issue>, JsError> {
    let issues: Vec<JsIssue> = serde_wasm_bindgen::from_value(issues)
        .map_err(|e| JsError::new(&format!("Invalid issues: {}", e)))?;
    Ok(issues.into_iter().map(Issue::from).collect())
}

/// Annotates the current page with flagged claims.
///
/// One instance per page load. `free()` reverts the page.
#[wasm_bindgen]
pub struct JsAnnotator {
    inner: BrowserAnnotator,
}

#[wasm_bindgen]
impl JsAnnotator {
    /// Create an annotator. `config` is optional; omitted fields keep their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsAnnotator, JsError> {
        let config: AnnotatorConfig = if config.is_undefined() || config.is_null() {
            AnnotatorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsError::new(&format!("Invalid config: {}", e)))?
        };
        let inner = BrowserAnnotator::new(config).map_err(|e| JsError::new(&e.to_string()))?;
        Ok(Self { inner })
    }

    /// Annotate after the settle delay. A newer batch replaces a pending one.
    pub fn annotate(&self, issues: JsValue) -> Result<(), JsError> {
        let issues = parse_issues(issues)?;
        tracing::debug!(target: "factmark::js", issues = issues.len(), "batch scheduled");
        self.inner.schedule(issues);
        Ok(())
    }

    /// Annotate immediately and return the outcomes.
    #[wasm_bindgen(js_name = annotateNow)]
    pub fn annotate_now(&self, issues: JsValue) -> Result<JsReport, JsError> {
        let issues = parse_issues(issues)?;
        Ok(JsReport::from(&self.inner.annotate_now(&issues)))
    }

    /// Outcomes of the most recent pass, or `null`.
    #[wasm_bindgen(js_name = lastReport)]
    pub fn last_report(&self) -> Result<JsValue, JsError> {
        let report = self
            .inner
            .with_session(|s| s.last_report().map(JsReport::from));
        serde_wasm_bindgen::to_value(&report)
            .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
    }

    /// Remove every highlight, the tooltip and the stylesheet.
    pub fn cleanup(&self) {
        self.inner.cleanup();
    }

    /// Set the report callback.
    /// Callback signature: (request: { url: string, title: string, issue: Issue }) => void
    ///
    /// Without a callback, reports are posted to the window as
    /// `{ type: "factmark:report", url, title, issue }`.
    #[wasm_bindgen(js_name = onReport)]
    pub fn on_report(&self, callback: Option<js_sys::Function>) {
        self.inner.set_report_callback(callback);
    }

    /// Number of wrapped highlights currently on the page.
    #[wasm_bindgen(js_name = highlightCount)]
    pub fn highlight_count(&self) -> usize {
        self.inner.with_session(|s| s.active_highlights().len())
    }

    /// Number of paragraph-level fallback highlights currently on the page.
    #[wasm_bindgen(js_name = fallbackCount)]
    pub fn fallback_count(&self) -> usize {
        self.inner.with_session(|s| s.fallback_highlights().len())
    }
}
