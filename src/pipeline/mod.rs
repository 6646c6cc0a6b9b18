//! The relay pipeline: filter engine, per-cycle pass, and poll loop.

pub mod cycle;
pub mod filter;
pub mod scheduler;

pub use cycle::Relay;
pub use filter::{FilterDecision, RejectReason, evaluate};
pub use scheduler::{CountedTicker, IntervalTicker, LoopState, PollLoop, Ticker};
