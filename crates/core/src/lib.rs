//! `tubedesk-core` -- approval logic for the tubedesk content dashboard.
//!
//! Everything in this crate is pure: callers pass in snapshots fetched from
//! the data store and get derived values or validation verdicts back. No
//! I/O, no shared state.

pub mod approval;
pub mod approval_action;
pub mod approval_filter;
pub mod approval_stats;
pub mod error;
pub mod types;
pub mod validation;
