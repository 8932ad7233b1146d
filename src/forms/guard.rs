use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Rejects a submission while another one for the same key is in flight.
#[derive(Debug, Default)]
pub struct SubmitGuard {
    in_flight: Mutex<HashSet<String>>,
}

/// Proof of an accepted submission; releases its key on drop.
#[derive(Debug)]
pub struct SubmitTicket<'a> {
    guard: &'a SubmitGuard,
    key: String,
}

impl SubmitGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `None` if a submission for `key` is still running.
    pub fn try_begin(&self, key: impl Into<String>) -> Option<SubmitTicket<'_>> {
        let key = key.into();
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if !in_flight.insert(key.clone()) {
            return None;
        }
        Some(SubmitTicket { guard: self, key })
    }

    pub fn is_submitting(&self, key: &str) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }
}

impl Drop for SubmitTicket<'_> {
    fn drop(&mut self) {
        self.guard
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}
