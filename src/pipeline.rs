//! # Check Pipeline
//!
//! Scan -> rate -> report -> (optionally) set up fail2ban. The binary calls
//! [`run_check`] with stdout, a stdin prompt and the real command runner;
//! tests pass a buffer, a scripted answer and a recording runner.

use std::io::Write;

use crate::detection::{attempts_per_hour, exceeds_threshold, RATE_THRESHOLD};
use crate::log_sources::auth_log::AuthLogSource;
use crate::response::prompt::Confirmation;
use crate::response::runner::CommandRunner;
use crate::response::{Fail2banInstaller, SetupOutcome};
use crate::{CheckerConfig, CheckerResult};

/// Remote addresses listed in the log output after a scan.
const TOP_SOURCES_LOGGED: usize = 5;

/// What a run ended up doing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunOutcome {
    /// Rate at or below the threshold; nothing else happens.
    BelowThreshold { rate: f64 },
    /// Rate too high, but `--setup-fail2ban` was not given.
    SetupSuggested { rate: f64 },
    /// Operator answered something other than "yes".
    Declined { rate: f64 },
    /// fail2ban installed, configured and restarted.
    Installed { rate: f64 },
}

impl RunOutcome {
    pub fn rate(&self) -> f64 {
        match *self {
            RunOutcome::BelowThreshold { rate }
            | RunOutcome::SetupSuggested { rate }
            | RunOutcome::Declined { rate }
            | RunOutcome::Installed { rate } => rate,
        }
    }
}

/// Scan the configured log, print the rate and respond to it.
///
/// The report goes to `out`. `confirm` and `runner` are only touched when
/// the rate exceeds the threshold and `setup_requested` is set.
pub fn run_check(
    config: &CheckerConfig,
    setup_requested: bool,
    out: &mut dyn Write,
    confirm: &mut dyn Confirmation,
    runner: &mut dyn CommandRunner,
) -> CheckerResult<RunOutcome> {
    let source = AuthLogSource::new(
        config.general.log_path.clone(),
        config.general.reference_year,
    );
    let scan = source.scan()?;
    for (ip, count) in scan.top_sources(TOP_SOURCES_LOGGED) {
        log::info!("  {} failed attempts from {}", count, ip);
    }

    let rate = attempts_per_hour(&scan)?;
    writeln!(out, "Failed authentication attempts per hour: {:?}", rate)?;

    if !exceeds_threshold(rate) {
        return Ok(RunOutcome::BelowThreshold { rate });
    }

    writeln!(
        out,
        "Warning: More than {} failed authentication attempts in the last hour.",
        RATE_THRESHOLD
    )?;

    if !setup_requested {
        writeln!(out, "Use --setup-fail2ban option to set up Fail2Ban.")?;
        return Ok(RunOutcome::SetupSuggested { rate });
    }

    match Fail2banInstaller::new(config).setup(confirm, runner)? {
        SetupOutcome::Installed => {
            writeln!(out, "Fail2Ban has been set up and started.")?;
            Ok(RunOutcome::Installed { rate })
        }
        SetupOutcome::Declined => {
            writeln!(out, "Aborted Fail2Ban setup.")?;
            Ok(RunOutcome::Declined { rate })
        }
    }
}
