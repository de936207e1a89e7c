//! # Failed-Attempt Rate
//!
//! Turns a scan into failed attempts per hour over the span between the
//! earliest and latest match:
//!
//! ```text
//! rate = count / ((last - first) in hours)
//! ```
//!
//! The rate is undefined for an empty scan or a zero-length span; both are
//! reported as errors rather than as a sentinel value.

use crate::log_sources::ScanResult;
use crate::{CheckerError, CheckerResult};

/// Rates strictly above this many attempts per hour trigger the warning.
pub const RATE_THRESHOLD: f64 = 10.0;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Failed attempts per hour for a completed scan.
///
/// # Errors
/// * `NoFailedAttempts` when nothing matched.
/// * `ZeroTimeSpan` when every match carries the same timestamp, which
///   includes the single-match case.
pub fn attempts_per_hour(scan: &ScanResult) -> CheckerResult<f64> {
    let elapsed = scan.elapsed().ok_or_else(|| CheckerError::NoFailedAttempts {
        path: scan.path.clone(),
    })?;

    let hours = elapsed.num_milliseconds() as f64 / 1000.0 / SECONDS_PER_HOUR;
    if hours <= 0.0 {
        return Err(CheckerError::ZeroTimeSpan { count: scan.count });
    }

    Ok(scan.count as f64 / hours)
}

/// True when `rate` is above [`RATE_THRESHOLD`].
pub fn exceeds_threshold(rate: f64) -> bool {
    rate > RATE_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_sources::{FailedAttempt, FailureMarker};
    use chrono::{NaiveDate, NaiveDateTime};
    use std::path::PathBuf;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn scan_of(times: &[NaiveDateTime]) -> ScanResult {
        let mut scan = ScanResult::new(PathBuf::from("auth.log"));
        for (i, t) in times.iter().enumerate() {
            scan.record(&FailedAttempt {
                line: i + 1,
                timestamp: *t,
                marker: FailureMarker::FailedPassword,
                source_ip: None,
            });
        }
        scan
    }

    #[test]
    fn test_twenty_over_four_hours_is_five() {
        let times: Vec<_> = (0..20).map(|i| at(1 + (i % 5) as u32, 0)).collect();
        let rate = attempts_per_hour(&scan_of(&times)).unwrap();
        assert!((rate - 5.0).abs() < 1e-9);
        assert!(!exceeds_threshold(rate));
    }

    #[test]
    fn test_rate_is_linear_in_count_and_inverse_in_span() {
        let two_hours = attempts_per_hour(&scan_of(&[at(0, 0), at(1, 0), at(2, 0)])).unwrap();
        assert!((two_hours - 1.5).abs() < 1e-9);

        let doubled = attempts_per_hour(&scan_of(&[
            at(0, 0), at(0, 0), at(1, 0), at(1, 0), at(2, 0), at(2, 0),
        ]))
        .unwrap();
        assert!((doubled - 3.0).abs() < 1e-9);

        let half_span = attempts_per_hour(&scan_of(&[at(0, 0), at(0, 30), at(1, 0)])).unwrap();
        assert!((half_span - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_scan_is_error() {
        let err = attempts_per_hour(&scan_of(&[])).unwrap_err();
        assert!(matches!(err, CheckerError::NoFailedAttempts { .. }));
    }

    #[test]
    fn test_single_match_is_zero_span_error() {
        let err = attempts_per_hour(&scan_of(&[at(3, 0)])).unwrap_err();
        assert!(matches!(err, CheckerError::ZeroTimeSpan { count: 1 }));
    }

    #[test]
    fn test_identical_timestamps_are_zero_span_error() {
        let err = attempts_per_hour(&scan_of(&[at(3, 0), at(3, 0), at(3, 0)])).unwrap_err();
        assert!(matches!(err, CheckerError::ZeroTimeSpan { count: 3 }));
    }

    #[test]
    fn test_threshold_is_strict() {
        assert!(!exceeds_threshold(10.0));
        assert!(exceeds_threshold(10.01));
        assert!(!exceeds_threshold(0.0));
    }
}
