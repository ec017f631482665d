//! Per-slot bookkeeping for scheduled callbacks.
//!
//! Arming a slot always clears the previous timer in that slot, so at most
//! one show timer and one hide timer are live at any time.

use std::collections::HashMap;

use crate::platform::{TimerPlatform, TimerSlot, TimerToken};

#[derive(Debug, Default)]
pub struct TimerBook {
    next_seq: u64,
    pending: HashMap<TimerSlot, TimerToken>,
}

impl TimerBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a callback in `slot`, replacing any pending one.
    pub fn arm<T: TimerPlatform + ?Sized>(
        &mut self,
        timers: &T,
        slot: TimerSlot,
        delay_ms: u32,
    ) -> TimerToken {
        self.cancel(timers, slot);
        self.next_seq += 1;
        let token = TimerToken {
            slot,
            seq: self.next_seq,
        };
        self.pending.insert(slot, token);
        timers.set_timeout(token, delay_ms);
        tracing::trace!(target: "factmark::timers", ?slot, seq = token.seq, delay_ms, "armed");
        token
    }

    pub fn cancel<T: TimerPlatform + ?Sized>(&mut self, timers: &T, slot: TimerSlot) {
        if let Some(old) = self.pending.remove(&slot) {
            timers.clear_timeout(old);
        }
    }

    pub fn cancel_all<T: TimerPlatform + ?Sized>(&mut self, timers: &T) {
        for (_, token) in self.pending.drain() {
            timers.clear_timeout(token);
        }
    }

    /// Consume a fired token. Returns false for stale or unknown tokens.
    pub fn take(&mut self, token: TimerToken) -> bool {
        match self.pending.get(&token.slot) {
            Some(current) if *current == token => {
                self.pending.remove(&token.slot);
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self, slot: TimerSlot) -> bool {
        self.pending.contains_key(&slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::ManualTimers;

    #[test]
    fn test_arm_replaces_previous() {
        let timers = ManualTimers::new();
        let mut book = TimerBook::new();

        let first = book.arm(&timers, TimerSlot::Hide, 100);
        let second = book.arm(&timers, TimerSlot::Hide, 100);

        assert_eq!(timers.pending_count(), 1);
        assert!(!book.take(first));
        assert!(book.take(second));
        assert!(!book.take(second));
    }

    #[test]
    fn test_slots_are_independent() {
        let timers = ManualTimers::new();
        let mut book = TimerBook::new();

        book.arm(&timers, TimerSlot::Show, 100);
        book.arm(&timers, TimerSlot::Hide, 2000);
        assert_eq!(timers.pending_count(), 2);

        book.cancel(&timers, TimerSlot::Show);
        assert!(!book.is_pending(TimerSlot::Show));
        assert!(book.is_pending(TimerSlot::Hide));
        assert_eq!(timers.pending_count(), 1);

        book.cancel_all(&timers);
        assert_eq!(timers.pending_count(), 0);
    }
}
