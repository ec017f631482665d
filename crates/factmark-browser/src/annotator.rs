//! `BrowserAnnotator`: one annotation session for the current page.

use std::cell::RefCell;
use std::rc::Rc;

use factmark_core::{
    AnnotationReport, AnnotationSession, AnnotatorConfig, DomError, Issue,
};

use crate::dispatch::Dispatcher;
use crate::dom::BrowserDom;
use crate::host::BrowserHost;
use crate::timers::BrowserTimers;

pub type BrowserSession = AnnotationSession<BrowserDom, BrowserTimers, BrowserHost>;

/// Owns the session and wires its callbacks.
///
/// Every method borrows the session for the duration of the call only.
/// Dropping the annotator reverts the page.
pub struct BrowserAnnotator {
    session: Rc<RefCell<BrowserSession>>,
}

impl BrowserAnnotator {
    pub fn new(config: AnnotatorConfig) -> Result<Self, DomError> {
        let window =
            web_sys::window().ok_or_else(|| DomError::new("window", "no global window"))?;
        let dispatcher = Dispatcher::new();
        let dom = BrowserDom::new(window.clone(), dispatcher.clone())?;
        let timers = BrowserTimers::new(dispatcher.clone());
        let host = BrowserHost::new(window);

        let session = Rc::new(RefCell::new(AnnotationSession::new(dom, timers, host, config)));
        dispatcher.bind(&session);
        tracing::debug!(target: "factmark::browser", "annotator ready");
        Ok(Self { session })
    }

    /// Annotate immediately and return the per-issue outcomes.
    pub fn annotate_now(&self, issues: &[Issue]) -> AnnotationReport {
        self.session.borrow_mut().annotate(issues)
    }

    /// Annotate after the page has had time to settle.
    pub fn schedule(&self, issues: Vec<Issue>) {
        self.session.borrow_mut().schedule_annotate(issues);
    }

    pub fn cleanup(&self) {
        self.session.borrow_mut().cleanup();
    }

    pub fn set_report_callback(&self, callback: Option<js_sys::Function>) {
        self.session.borrow().host().set_report_callback(callback);
    }

    /// Read-only access to the session, e.g. for lookups.
    pub fn with_session<R>(&self, f: impl FnOnce(&BrowserSession) -> R) -> R {
        f(&*self.session.borrow())
    }
}

impl Drop for BrowserAnnotator {
    fn drop(&mut self) {
        match self.session.try_borrow_mut() {
            Ok(mut session) => session.cleanup(),
            Err(_) => tracing::warn!(target: "factmark::browser", "annotator dropped while in use"),
        }
    }
}
