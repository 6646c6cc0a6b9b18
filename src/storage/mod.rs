//! Persistence for the seen-set of delivered post identifiers.
//!
//! The store is the only durable state in the pipeline. Once `record(id)`
//! returns `Ok`, `contains(id)` must return true in every later process
//! invocation. Entries are never removed.

pub mod file;
pub mod memory;

use async_trait::async_trait;

use crate::error::Result;

// Re-export for convenience
pub use file::FileSeenStore;
pub use memory::MemorySeenStore;

/// Trait for seen-set backends.
#[async_trait]
pub trait SeenStore: Send + Sync {
    /// Whether the identifier was previously recorded.
    async fn contains(&self, id: &str) -> bool;

    /// Durably persist the identifier. Idempotent: recording the same
    /// identifier twice has no additional effect.
    async fn record(&self, id: &str) -> Result<()>;

    /// Number of recorded identifiers.
    async fn len(&self) -> usize;
}
