//! `TimerPlatform` backed by `setTimeout`.

use std::cell::RefCell;
use std::collections::HashMap;

use factmark_core::{TimerPlatform, TimerSlot, TimerToken};
use gloo_timers::callback::Timeout;

use crate::dispatch::Dispatcher;

/// One live `Timeout` per slot. Dropping a `Timeout` cancels it.
pub struct BrowserTimers {
    dispatcher: Dispatcher,
    live: RefCell<HashMap<TimerSlot, (TimerToken, Timeout)>>,
}

impl BrowserTimers {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            live: RefCell::new(HashMap::new()),
        }
    }
}

impl TimerPlatform for BrowserTimers {
    fn set_timeout(&self, token: TimerToken, delay_ms: u32) {
        let dispatcher = self.dispatcher.clone();
        let timeout = Timeout::new(delay_ms, move || dispatcher.timer(token));
        let previous = self.live.borrow_mut().insert(token.slot, (token, timeout));
        drop(previous);
    }

    fn clear_timeout(&self, token: TimerToken) {
        let mut live = self.live.borrow_mut();
        if live.get(&token.slot).is_some_and(|(t, _)| *t == token) {
            live.remove(&token.slot);
        }
    }
}
