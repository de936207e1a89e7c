//! Log source types: what a failed attempt looks like once parsed, and the
//! accumulator a scan fills in.

pub mod auth_log;

use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::PathBuf;

/// Substring that marks an auth log line as a failed authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureMarker {
    /// sshd: "Failed password for ..."
    FailedPassword,
    /// PAM: "pam_unix(...): authentication failure; ..."
    AuthenticationFailure,
    /// sshd: "Invalid user ... from ..."
    InvalidUser,
}

impl FailureMarker {
    pub const ALL: [FailureMarker; 3] = [
        FailureMarker::FailedPassword,
        FailureMarker::AuthenticationFailure,
        FailureMarker::InvalidUser,
    ];

    pub fn needle(self) -> &'static str {
        match self {
            FailureMarker::FailedPassword => "Failed password",
            FailureMarker::AuthenticationFailure => "authentication failure",
            FailureMarker::InvalidUser => "Invalid user",
        }
    }

    /// First marker contained in `line`, if any. A line counts once even
    /// when it carries several markers.
    pub fn find(line: &str) -> Option<FailureMarker> {
        Self::ALL.into_iter().find(|m| line.contains(m.needle()))
    }
}

/// One failed authentication line.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedAttempt {
    /// 1-based line number in the scanned log.
    pub line: usize,
    pub timestamp: NaiveDateTime,
    pub marker: FailureMarker,
    /// Remote address from `from <ip>` or `rhost=<ip>`, when present.
    pub source_ip: Option<IpAddr>,
}

/// Accumulated result of scanning one log.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    /// Log that was scanned.
    pub path: PathBuf,

    /// Earliest matching timestamp (not necessarily the first in file order).
    pub first: Option<NaiveDateTime>,

    /// Latest matching timestamp.
    pub last: Option<NaiveDateTime>,

    /// Number of matching lines.
    pub count: usize,

    /// Failed attempts per remote address, for lines that name one.
    pub sources: BTreeMap<IpAddr, usize>,
}

impl ScanResult {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            first: None,
            last: None,
            count: 0,
            sources: BTreeMap::new(),
        }
    }

    /// Fold one failed attempt into the totals.
    pub fn record(&mut self, attempt: &FailedAttempt) {
        if self.first.is_none_or(|first| attempt.timestamp < first) {
            self.first = Some(attempt.timestamp);
        }
        if self.last.is_none_or(|last| attempt.timestamp > last) {
            self.last = Some(attempt.timestamp);
        }
        if let Some(ip) = attempt.source_ip {
            *self.sources.entry(ip).or_insert(0) += 1;
        }
        self.count += 1;
    }

    /// Span between the earliest and latest match. `None` until something
    /// has been recorded.
    pub fn elapsed(&self) -> Option<chrono::Duration> {
        Some(self.last? - self.first?)
    }

    /// Addresses ordered by attempt count, highest first.
    pub fn top_sources(&self, limit: usize) -> Vec<(IpAddr, usize)> {
        let mut ranked: Vec<(IpAddr, usize)> =
            self.sources.iter().map(|(ip, n)| (*ip, *n)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(limit);
        ranked
    }
}
