// src/lib.rs

//! birdwatch library
//!
//! Polls the Twitter recent-search API for configured keyword queries,
//! filters candidates, suppresses already-delivered posts, and relays the
//! rest to per-channel Discord webhooks.

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
