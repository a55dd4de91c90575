//! Contribution streaks
//!
//! # Overview
//!
//! A streak is a maximal run of consecutive calendar days each containing at least one recorded activity.
//! Activity is gathered from a source-control hosting API (commits, repository creations, issues, pull requests and releases)
//! into an [`ActivityLedger`](ledger::ActivityLedger), keyed by calendar date.
//! From the set of active dates the library computes the current streak (ending today or yesterday),
//! the best previous streak and, when there is no current streak, the number of days since the last activity.

#[cfg(feature = "api")]
pub mod api;
pub mod calculator;
#[cfg(feature = "collector")]
pub mod collector;
pub mod ledger;

pub use calculator::{calculate_streaks, streaks, Streak, StreakResult};
pub use ledger::{ActivityKind, ActivityLedger, ActivityLedgerBuilder, LookbackWindow};
