//! Statistics module for FocusFlow
//!
//! Aggregates over the session ledger: totals, averages, completion rate
//! and the daily streak.

mod summary;

pub use summary::{Statistics, StatsSummary};
