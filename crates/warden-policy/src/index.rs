//! Per-route pattern index.
//!
//! Each registered route owns one [`PatternIndex`] holding
//! `(id, compiled pattern, payload)` entries. Readers take a snapshot with a
//! single atomic load; writers publish a new snapshot copy-on-write, so a
//! reader never observes a half-applied insert or removal.

use std::sync::Arc;

use arc_swap::ArcSwap;
use serde_json::Value;

use crate::pattern::Pattern;

/// One registered pattern and the payload it yields on match.
#[derive(Debug)]
struct Entry<T> {
    id: String,
    pattern: Arc<Pattern>,
    payload: Arc<T>,
}

/// Concurrently readable `pattern -> payload` index.
#[derive(Debug)]
pub struct PatternIndex<T> {
    entries: ArcSwap<Vec<Arc<Entry<T>>>>,
}

impl<T> Default for PatternIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PatternIndex<T> {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Register `payload` under `pattern`. Entries with the same `id` are
    /// kept side by side; removal drops all of them.
    pub fn insert(&self, id: impl Into<String>, pattern: Arc<Pattern>, payload: Arc<T>) {
        let entry = Arc::new(Entry {
            id: id.into(),
            pattern,
            payload,
        });
        self.entries.rcu(|current| {
            let mut next = Vec::with_capacity(current.len() + 1);
            next.extend(current.iter().cloned());
            next.push(Arc::clone(&entry));
            next
        });
    }

    /// Remove every entry registered under `id`, returning how many were
    /// removed.
    pub fn remove(&self, id: &str) -> usize {
        let previous = self.entries.rcu(|current| {
            current
                .iter()
                .filter(|e| e.id != id)
                .cloned()
                .collect::<Vec<_>>()
        });
        previous.iter().filter(|e| e.id == id).count()
    }

    /// Payloads whose pattern matches `event`, in registration order.
    #[must_use]
    pub fn matches(&self, event: &Value) -> Vec<Arc<T>> {
        let snapshot = self.entries.load();
        snapshot
            .iter()
            .filter(|e| e.pattern.matches(event))
            .map(|e| Arc::clone(&e.payload))
            .collect()
    }

    /// IDs of every registered entry, in registration order.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.entries.load().iter().map(|e| e.id.clone()).collect()
    }

    /// Returns `true` if an entry is registered under `id`.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.load().iter().any(|e| e.id == id)
    }

    /// Number of registered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.load().len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.load().is_empty()
    }
}
