//! # auth-checker - Core Library
//!
//! Estimates how many failed logins per hour an authentication log records
//! and, when the rate is too high, installs and configures fail2ban.
//!
//! ## Layout
//! - `log_sources` - scans the auth log for failed-attempt lines.
//! - `detection` - turns a scan into an attempts-per-hour rate.
//! - `response` - confirmation prompt, command runner, fail2ban installer.
//! - `pipeline` - the check-then-respond flow behind the CLI.

pub mod detection;
pub mod log_sources;
pub mod pipeline;
pub mod response;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::response::jail::JailConfig;
use crate::response::InstallStep;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Unified error type for auth-checker.
#[derive(Error, Debug)]
pub enum CheckerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cannot read auth log {}: {source}", .path.display())]
    LogRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Log parse error on line {line}: {reason}")]
    LogParse { line: usize, reason: String },

    #[error("No failed authentication attempts found in {}", .path.display())]
    NoFailedAttempts { path: PathBuf },

    #[error("Cannot compute a rate: {count} failed attempt(s) share a zero-length time span")]
    ZeroTimeSpan { count: usize },

    #[error("Failed to execute `{command}`: {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{step} step failed: `{command}` exited with {status}")]
    CommandFailed {
        step: InstallStep,
        command: String,
        status: response::runner::CommandStatus,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

pub type CheckerResult<T> = Result<T, CheckerError>;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Top-level configuration.
///
/// Loaded from `auth-checker.toml` or the path given with `--config`. Every
/// section falls back to its defaults when omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CheckerConfig {
    /// Where the auth log lives.
    pub general: GeneralConfig,

    /// Commands and paths used to install fail2ban.
    pub installer: InstallerConfig,

    /// Contents of the `[sshd]` jail written on setup.
    pub jail: JailConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Authentication log to scan.
    pub log_path: PathBuf,

    /// Year assumed for the first matching line, since syslog timestamps
    /// carry none. `None` means the current UTC year.
    pub reference_year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerConfig {
    /// Package manager binary, e.g. `apt-get`.
    pub package_manager: String,

    /// Arguments placed before the package name.
    pub package_manager_args: Vec<String>,

    /// Package to install.
    pub package: String,

    /// Service manager binary, e.g. `systemctl`.
    pub service_manager: String,

    /// Service unit to enable and restart.
    pub service: String,

    /// Destination of the jail configuration. Overwritten without backup.
    pub jail_path: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("/var/log/auth.log"),
            reference_year: None,
        }
    }
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            package_manager: "apt-get".to_string(),
            package_manager_args: vec!["install".to_string(), "-y".to_string()],
            package: "fail2ban".to_string(),
            service_manager: "systemctl".to_string(),
            service: "fail2ban".to_string(),
            jail_path: PathBuf::from("/etc/fail2ban/jail.local"),
        }
    }
}

impl CheckerConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> CheckerResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: CheckerConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Write the default configuration to a TOML file.
    pub fn write_default(path: &Path) -> CheckerResult<()> {
        let content = toml::to_string_pretty(&Self::default())
            .map_err(|e| CheckerError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
