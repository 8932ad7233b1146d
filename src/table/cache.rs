//! Results keyed by the full list tuple, so late responses for a superseded
//! key are never shown.

use std::collections::{HashMap, VecDeque};

use crate::services::listing::{FieldFilter, ListResult};

/// Number of results kept per page.
pub const CACHE_CAPACITY: usize = 32;

/// Everything that determines a list result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListKey {
    pub entity: &'static str,
    pub page: usize,
    pub limit: usize,
    pub status: String,
    pub search: String,
    pub filter: Option<String>,
    pub scope: Option<FieldFilter>,
}

#[derive(Debug)]
pub struct QueryCache<T> {
    entries: HashMap<ListKey, ListResult<T>>,
    order: VecDeque<ListKey>,
    active: Option<ListKey>,
    capacity: usize,
}

impl<T> Default for QueryCache<T> {
    fn default() -> Self {
        Self::with_capacity(CACHE_CAPACITY)
    }
}

impl<T> QueryCache<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            active: None,
            capacity: capacity.max(1),
        }
    }

    /// Makes `key` the one the page shows. Returns `true` when there is no
    /// result for it yet and a fetch should be issued.
    pub fn activate(&mut self, key: ListKey) -> bool {
        let missing = !self.entries.contains_key(&key);
        self.active = Some(key);
        missing
    }

    /// Stores the result of a fetch for `key`, whether or not it is still
    /// active. Returns `true` if it is the active key.
    pub fn resolve(&mut self, key: ListKey, result: ListResult<T>) -> bool {
        let is_active = self.active.as_ref() == Some(&key);
        if self.entries.insert(key.clone(), result).is_none() {
            self.order.push_back(key);
        }
        self.evict();
        is_active
    }

    /// Result of the active key only.
    pub fn current(&self) -> Option<&ListResult<T>> {
        self.active.as_ref().and_then(|key| self.entries.get(key))
    }

    /// Active key without a result.
    pub fn is_loading(&self) -> bool {
        self.active.is_some() && self.current().is_none()
    }

    /// Drops every result, e.g. after a write. The active key is kept.
    pub fn invalidate(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    fn evict(&mut self) {
        while self.entries.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            if self.active.as_ref() == Some(&oldest) {
                self.order.push_back(oldest);
                if self.order.len() == 1 {
                    break;
                }
                continue;
            }
            self.entries.remove(&oldest);
        }
    }
}
