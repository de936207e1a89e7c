//! # Command Runner
//!
//! Every external program the installer starts goes through
//! [`CommandRunner`], so tests can swap in a recorder instead of touching
//! the package manager or systemd.
//!
//! Commands are passed as a program plus an argument vector and executed
//! without a shell. They inherit stdin/stdout/stderr so the operator sees
//! apt and systemctl output as it happens. There is no timeout: a hung
//! command blocks the run.

use std::fmt;
use std::process::Command;

use crate::{CheckerError, CheckerResult};

/// Exit status of a finished command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandStatus {
    /// Exit code, or `None` when the process was killed by a signal.
    pub code: Option<i32>,
}

impl CommandStatus {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }
}

impl fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit status {}", code),
            None => write!(f, "termination by signal"),
        }
    }
}

impl From<std::process::ExitStatus> for CommandStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        Self { code: status.code() }
    }
}

/// Runs an external program to completion.
pub trait CommandRunner {
    /// Start `program` with `args` and wait for it. `Err` only when the
    /// program could not be started; a non-zero exit is an `Ok` status.
    fn run(&mut self, program: &str, args: &[String]) -> CheckerResult<CommandStatus>;
}

/// Render a command line for messages and logs.
pub fn display_command(program: &str, args: &[String]) -> String {
    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

/// Runs commands on the real system via `std::process::Command`.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, program: &str, args: &[String]) -> CheckerResult<CommandStatus> {
        log::debug!("Executing: {}", display_command(program, args));
        let status = Command::new(program)
            .args(args)
            .status()
            .map_err(|source| CheckerError::CommandSpawn {
                command: display_command(program, args),
                source,
            })?;
        Ok(status.into())
    }
}
