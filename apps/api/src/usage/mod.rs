//! AI usage ledger and rate gate.
//!
//! Every AI-backed attempt is appended to the `ai_usage` ledger. The gate counts
//! ledger rows inside a trailing window to admit or deny the next attempt, and the
//! stats read path aggregates the same rows for reporting.

pub mod clock;
pub mod handlers;
pub mod ledger;
#[cfg(test)]
pub mod memory;
pub mod models;
pub mod permits;
pub mod store;

pub use ledger::{RateLimitPolicy, UsageLedger};
