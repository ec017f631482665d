//! Callback routing from the page back into the session.
//!
//! Listeners and timers hold a `Dispatcher`, never the session itself. The
//! dispatcher keeps only a `Weak` reference, so callbacks that outlive the
//! annotator do nothing.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use factmark_core::{TimerToken, UiEvent};
use gloo_timers::callback::Timeout;

use crate::annotator::BrowserSession;

#[derive(Clone, Default)]
pub struct Dispatcher {
    session: Rc<RefCell<Weak<RefCell<BrowserSession>>>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn bind(&self, session: &Rc<RefCell<BrowserSession>>) {
        *self.session.borrow_mut() = Rc::downgrade(session);
    }

    pub fn event(&self, event: UiEvent) {
        self.with_session(move |session| session.handle_event(event));
    }

    pub fn timer(&self, token: TimerToken) {
        self.with_session(move |session| session.fire_timer(token));
    }

    fn with_session<F>(&self, f: F)
    where
        F: FnOnce(&mut BrowserSession) + 'static,
    {
        let Some(session) = self.session.borrow().upgrade() else {
            return;
        };
        match session.try_borrow_mut() {
            Ok(mut session) => f(&mut *session),
            Err(_) => {
                // Fired synchronously from inside a session call (e.g. an
                // event dispatched by a DOM mutation). Run it on the next tick.
                let this = self.clone();
                Timeout::new(0, move || this.with_session(f)).forget();
            }
        }
    }
}
