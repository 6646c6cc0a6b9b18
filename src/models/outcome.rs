// src/models/outcome.rs

//! Delivery outcomes and per-cycle statistics.

use serde::{Deserialize, Serialize};

/// Outcome of one webhook delivery attempt.
#[derive(Debug, Clone)]
pub struct DispatchResult {
    /// Destination webhook URL
    pub webhook_url: String,

    /// Identifier of the post that was delivered (or not)
    pub post_id: String,

    /// Error detail on failure, `None` on success
    pub error: Option<String>,
}

impl DispatchResult {
    /// Successful delivery.
    pub fn ok(webhook_url: impl Into<String>, post_id: impl Into<String>) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            post_id: post_id.into(),
            error: None,
        }
    }

    /// Failed delivery with an error detail.
    pub fn failed(
        webhook_url: impl Into<String>,
        post_id: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            post_id: post_id.into(),
            error: Some(error.into()),
        }
    }

    /// Whether the delivery succeeded.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Summary of one full pipeline pass over the configured channels.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CycleStats {
    /// Queries processed this cycle
    pub queries_total: usize,
    /// Queries whose search call failed
    pub queries_failed: usize,
    /// Candidates returned by the search API
    pub candidates: usize,
    /// Candidates rejected by the filter engine
    pub filtered_out: usize,
    /// Candidates skipped because they were already delivered
    pub duplicates_skipped: usize,
    /// Candidates outside the search window
    pub outside_window: usize,
    /// Posts successfully dispatched
    pub dispatched: usize,
    /// Dispatch attempts that failed
    pub dispatch_failures: usize,
}

impl CycleStats {
    /// Merge stats from one query pass into the cycle totals.
    pub fn absorb(&mut self, other: &CycleStats) {
        self.queries_total += other.queries_total;
        self.queries_failed += other.queries_failed;
        self.candidates += other.candidates;
        self.filtered_out += other.filtered_out;
        self.duplicates_skipped += other.duplicates_skipped;
        self.outside_window += other.outside_window;
        self.dispatched += other.dispatched;
        self.dispatch_failures += other.dispatch_failures;
    }
}
