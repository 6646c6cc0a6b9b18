// src/storage/memory.rs

//! In-memory seen-set for tests and dry runs. Not durable.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::Result;
use crate::storage::SeenStore;

/// Volatile seen-set backed by a `HashSet`.
#[derive(Debug, Default)]
pub struct MemorySeenStore {
    seen: Mutex<HashSet<String>>,
}

impl MemorySeenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed the set, simulating state loaded from a previous run.
    pub fn with_ids<I: IntoIterator<Item = String>>(ids: I) -> Self {
        Self {
            seen: Mutex::new(ids.into_iter().collect()),
        }
    }
}

#[async_trait]
impl SeenStore for MemorySeenStore {
    async fn contains(&self, id: &str) -> bool {
        self.seen.lock().expect("seen-set lock poisoned").contains(id)
    }

    async fn record(&self, id: &str) -> Result<()> {
        self.seen
            .lock()
            .expect("seen-set lock poisoned")
            .insert(id.to_string());
        Ok(())
    }

    async fn len(&self) -> usize {
        self.seen.lock().expect("seen-set lock poisoned").len()
    }
}
