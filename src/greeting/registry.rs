//! Name to id assignment.
//!
//! Ids come from one process-wide counter, so they are unique across all
//! names and follow global first-seen order. An entry is never changed or
//! removed once assigned (except through [`IdentityRegistry::reset`]).

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use crate::observability::metrics;

/// Source of greeting ids.
pub trait IdSource: Send + Sync + std::fmt::Debug {
    /// Id to attach to a greeting for `name`.
    fn id_for(&self, name: &str) -> u64;

    /// Drop all state so ids start again from 1.
    fn reset(&self);
}

/// Thread-safe registry mapping names to stable ids.
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    names: DashMap<String, u64>,
    counter: AtomicU64,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id for `name`, assigning the next counter value on first sight.
    ///
    /// The entry holds the shard write lock while the counter is bumped, so
    /// concurrent first lookups of the same name agree on a single id and the
    /// counter only moves for the winner.
    pub fn get_or_assign(&self, name: &str) -> u64 {
        if let Some(id) = self.names.get(name) {
            return *id;
        }

        let mut assigned = false;
        let id = *self
            .names
            .entry(name.to_string())
            .or_insert_with(|| {
                assigned = true;
                self.counter.fetch_add(1, Ordering::SeqCst) + 1
            });

        if assigned {
            tracing::debug!(name = %name, id, "Assigned greeting id");
            metrics::record_registry_size(self.names.len());
        }
        id
    }

    /// Previously assigned id, without assigning one.
    pub fn get(&self, name: &str) -> Option<u64> {
        self.names.get(name).map(|r| *r.value())
    }

    /// Number of distinct names seen.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Forget every entry and restart ids at 1.
    pub fn reset(&self) {
        self.names.clear();
        self.counter.store(0, Ordering::SeqCst);
        metrics::record_registry_size(0);
    }
}

impl IdSource for IdentityRegistry {
    fn id_for(&self, name: &str) -> u64 {
        self.get_or_assign(name)
    }

    fn reset(&self) {
        IdentityRegistry::reset(self);
    }
}

/// Hands out a fresh id on every call, ignoring the name.
#[derive(Debug, Default)]
pub struct RequestCounter {
    counter: AtomicU64,
}

impl RequestCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }
}

impl IdSource for RequestCounter {
    fn id_for(&self, _name: &str) -> u64 {
        self.counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn reset(&self) {
        self.counter.store(0, Ordering::SeqCst);
    }
}
