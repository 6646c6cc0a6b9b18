//! Domain models for candidate posts and pipeline outcomes.

pub mod outcome;
pub mod post;

pub use outcome::{CycleStats, DispatchResult};
pub use post::{Author, Post};
