// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use crate::config::PollConfig;
use crate::error::Result;

/// Create the shared HTTP client used for search and webhook calls.
///
/// The per-request timeout lives here; a timed-out call surfaces as a
/// per-query or per-dispatch failure, never as a process failure.
pub fn create_client(poll: &PollConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&poll.user_agent)
        .timeout(Duration::from_secs(poll.timeout_secs))
        .build()?;
    Ok(client)
}
