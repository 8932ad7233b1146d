use std::time::{Duration, Instant};

use crate::table::TableEvent;

/// Quiet period after the last keystroke before a search is emitted.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Buffers raw search input and releases it once typing pauses.
///
/// Time is passed in by the host so the debouncer works with any clock.
#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    delay: Duration,
    pending: Option<String>,
    changed_at: Option<Instant>,
    emitted: String,
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE)
    }
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            changed_at: None,
            emitted: String::new(),
        }
    }

    /// Starts from an already applied search, e.g. one restored from the URL.
    pub fn with_current(mut self, search: impl Into<String>) -> Self {
        self.emitted = search.into();
        self
    }

    /// Records a keystroke; restarts the quiet period.
    pub fn input(&mut self, value: impl Into<String>, now: Instant) {
        self.pending = Some(value.into());
        self.changed_at = Some(now);
    }

    /// Emits the buffered search once the quiet period has elapsed.
    ///
    /// Input that ends up equal to the last emitted search is dropped.
    pub fn poll(&mut self, now: Instant) -> Option<TableEvent> {
        let changed_at = self.changed_at?;
        if now.duration_since(changed_at) < self.delay {
            return None;
        }
        self.changed_at = None;
        let value = self.pending.take()?;
        if value == self.emitted {
            return None;
        }
        self.emitted = value.clone();
        Some(TableEvent::SearchChanged(value))
    }
}
