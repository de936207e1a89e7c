//! # Detection
//!
//! Decides whether a scanned log shows enough failed logins to warrant a
//! response. The only signal is the average failed-attempt rate.

pub mod rate;

pub use rate::{attempts_per_hour, exceeds_threshold, RATE_THRESHOLD};
