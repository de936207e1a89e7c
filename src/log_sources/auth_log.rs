//! Scanner for Linux `/var/log/auth.log`.
//!
//! Counts lines carrying one of the failure markers and records their
//! syslog timestamps. Matching is plain substring search; the regex below
//! only runs on lines that already matched, to pull out the remote address.
//!
//! Syslog timestamps (`Jan  5 14:23:01`) have no year. The scanner assumes a
//! reference year for the first match and moves to the next year when the
//! month jumps back by half a year or more, so a December to January log
//! still produces a positive span. Smaller backward steps are late writes
//! at a month boundary and keep the current year.

use crate::log_sources::{FailedAttempt, FailureMarker, ScanResult};
use crate::{CheckerError, CheckerResult};
use chrono::{Datelike, NaiveDateTime, Utc};
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::LazyLock;

/// sshd names the peer as "from <ip>", pam_unix as "rhost=<ip>".
static RE_REMOTE_ADDR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\bfrom\s+|\brhost=)([0-9A-Fa-f:.]+)").expect("regex")
});

const SYSLOG_TIMESTAMP_FORMAT: &str = "%Y %b %d %H:%M:%S";

/// Backward month jump that counts as a new year (Dec -> Jan is 11).
const ROLLOVER_MIN_MONTHS: u32 = 6;

// ---------------------------------------------------------------------------
// AuthLogSource
// ---------------------------------------------------------------------------

pub struct AuthLogSource {
    path: PathBuf,
    reference_year: i32,
}

impl AuthLogSource {
    /// `reference_year` is the year assumed for the first match; `None`
    /// uses the current UTC year.
    pub fn new(path: PathBuf, reference_year: Option<i32>) -> Self {
        Self {
            path,
            reference_year: reference_year.unwrap_or_else(|| Utc::now().year()),
        }
    }

    /// Read the whole log and accumulate every failed attempt.
    pub fn scan(&self) -> CheckerResult<ScanResult> {
        let file = File::open(&self.path).map_err(|source| CheckerError::LogRead {
            path: self.path.clone(),
            source,
        })?;
        log::debug!("Scanning {}", self.path.display());
        self.scan_reader(BufReader::new(file))
    }

    /// Scan any line-oriented reader. Invalid UTF-8 is replaced rather than
    /// rejected; auth logs occasionally carry raw bytes from usernames.
    pub fn scan_reader<R: BufRead>(&self, mut reader: R) -> CheckerResult<ScanResult> {
        let mut result = ScanResult::new(self.path.clone());
        let mut clock = SyslogClock::new(self.reference_year);
        let mut buf = Vec::new();
        let mut line_no = 0usize;

        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|source| CheckerError::LogRead {
                    path: self.path.clone(),
                    source,
                })?;
            if read == 0 {
                break;
            }
            line_no += 1;

            let line = String::from_utf8_lossy(&buf);
            if let Some(attempt) = parse_line(line_no, &line, &mut clock)? {
                log::trace!("line {}: {:?}", line_no, attempt.marker);
                result.record(&attempt);
            }
        }

        log::info!(
            "Scanned {} lines of {}: {} failed attempts",
            line_no,
            self.path.display(),
            result.count,
        );
        if clock.rollovers > 0 {
            log::info!("Log crosses {} year boundary(ies)", clock.rollovers);
        }
        Ok(result)
    }
}

/// Classify one line. Non-matching lines return `Ok(None)` without their
/// timestamp being looked at; a matching line with a bad timestamp is fatal.
fn parse_line(
    line_no: usize,
    line: &str,
    clock: &mut SyslogClock,
) -> CheckerResult<Option<FailedAttempt>> {
    let Some(marker) = FailureMarker::find(line) else {
        return Ok(None);
    };

    let timestamp = clock
        .stamp(line)
        .map_err(|reason| CheckerError::LogParse { line: line_no, reason })?;

    let source_ip = RE_REMOTE_ADDR
        .captures(line)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().trim_end_matches(['.', ':']).parse::<IpAddr>().ok());

    Ok(Some(FailedAttempt {
        line: line_no,
        timestamp,
        marker,
        source_ip,
    }))
}

// ---------------------------------------------------------------------------
// Timestamp parsing
// ---------------------------------------------------------------------------

/// Assigns years to year-less syslog timestamps in file order.
struct SyslogClock {
    year: i32,
    last_month: Option<u32>,
    rollovers: u32,
}

impl SyslogClock {
    fn new(year: i32) -> Self {
        Self {
            year,
            last_month: None,
            rollovers: 0,
        }
    }

    fn stamp(&mut self, line: &str) -> Result<NaiveDateTime, String> {
        let mut ts = parse_syslog_timestamp(line, self.year)?;
        match self.last_month {
            Some(prev) if prev >= ts.month() + ROLLOVER_MIN_MONTHS => {
                self.year += 1;
                self.rollovers += 1;
                ts = parse_syslog_timestamp(line, self.year)?;
            }
            // Late December line written after the log moved into January.
            Some(prev) if self.rollovers > 0 && ts.month() >= prev + ROLLOVER_MIN_MONTHS => {
                return parse_syslog_timestamp(line, self.year - 1);
            }
            _ => {}
        }
        self.last_month = Some(ts.month());
        Ok(ts)
    }
}

/// Parse the leading `<Mon> <Day> <HH:MM:SS>` tokens of a syslog line in
/// the given year.
pub fn parse_syslog_timestamp(line: &str, year: i32) -> Result<NaiveDateTime, String> {
    let tokens: Vec<&str> = line.split_whitespace().take(3).collect();
    if tokens.len() < 3 {
        return Err(format!("expected `<Mon> <Day> <HH:MM:SS>`, got {:?}", line.trim_end()));
    }
    let stamp = format!("{} {} {} {}", year, tokens[0], tokens[1], tokens[2]);
    NaiveDateTime::parse_from_str(&stamp, SYSLOG_TIMESTAMP_FORMAT)
        .map_err(|e| format!("bad timestamp {:?}: {}", tokens.join(" "), e))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
