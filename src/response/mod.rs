//! # fail2ban Installer
//!
//! Installs fail2ban, writes the sshd jail, then enables and restarts the
//! service. Runs only after the operator answers "yes".
//!
//! ```text
//! Prompted -> Declined  -> Aborted
//!          -> Confirmed -> Installing -> Configuring -> Enabling -> Restarting -> Done
//! ```
//!
//! Steps run strictly in order and the first failure ends the run. Nothing
//! is rolled back: if enabling fails, the new jail file stays in place and
//! the service stays as it was.

pub mod jail;
pub mod prompt;
pub mod runner;

use std::fmt;

use crate::response::jail::JailConfig;
use crate::response::prompt::Confirmation;
use crate::response::runner::{display_command, CommandRunner};
use crate::{CheckerConfig, CheckerError, CheckerResult, InstallerConfig};

/// Question shown before any change is made.
pub const SETUP_QUESTION: &str = "Do you want to set up Fail2Ban?";

/// A side-effecting step of the setup sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStep {
    /// Package manager install.
    Installing,
    /// Jail file write.
    Configuring,
    /// `systemctl enable`.
    Enabling,
    /// `systemctl restart`.
    Restarting,
}

impl InstallStep {
    pub const ORDER: [InstallStep; 4] = [
        InstallStep::Installing,
        InstallStep::Configuring,
        InstallStep::Enabling,
        InstallStep::Restarting,
    ];
}

impl fmt::Display for InstallStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstallStep::Installing => "install",
            InstallStep::Configuring => "configure",
            InstallStep::Enabling => "enable",
            InstallStep::Restarting => "restart",
        };
        f.write_str(name)
    }
}

/// How a setup request ended, when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupOutcome {
    Installed,
    Declined,
}

pub struct Fail2banInstaller {
    installer: InstallerConfig,
    jail: JailConfig,
}

impl Fail2banInstaller {
    pub fn new(config: &CheckerConfig) -> Self {
        Self {
            installer: config.installer.clone(),
            jail: config.jail.clone(),
        }
    }

    /// Ask first, then run every step. A declined prompt runs nothing.
    pub fn setup(
        &self,
        confirm: &mut dyn Confirmation,
        runner: &mut dyn CommandRunner,
    ) -> CheckerResult<SetupOutcome> {
        if !confirm.confirm(SETUP_QUESTION)? {
            log::info!("Setup declined by operator");
            return Ok(SetupOutcome::Declined);
        }
        self.install(runner)?;
        Ok(SetupOutcome::Installed)
    }

    /// Run the four steps without asking.
    pub fn install(&self, runner: &mut dyn CommandRunner) -> CheckerResult<()> {
        for step in InstallStep::ORDER {
            self.run_step(step, runner)?;
        }
        log::info!("[SERVICE] {} is enabled and running", self.installer.service);
        Ok(())
    }

    /// Program and arguments for a command step. `None` for the file write.
    pub fn command_for(&self, step: InstallStep) -> Option<(String, Vec<String>)> {
        let cfg = &self.installer;
        match step {
            InstallStep::Installing => {
                let mut args = cfg.package_manager_args.clone();
                args.push(cfg.package.clone());
                Some((cfg.package_manager.clone(), args))
            }
            InstallStep::Configuring => None,
            InstallStep::Enabling => Some((
                cfg.service_manager.clone(),
                vec!["enable".to_string(), cfg.service.clone()],
            )),
            InstallStep::Restarting => Some((
                cfg.service_manager.clone(),
                vec!["restart".to_string(), cfg.service.clone()],
            )),
        }
    }

    fn run_step(&self, step: InstallStep, runner: &mut dyn CommandRunner) -> CheckerResult<()> {
        let Some((program, args)) = self.command_for(step) else {
            return self.jail.write_to(&self.installer.jail_path);
        };

        let command = display_command(&program, &args);
        log::info!("[{}] {}", step_tag(step), command);

        let status = runner.run(&program, &args)?;
        if !status.success() {
            log::error!("[{}] `{}` failed with {}", step_tag(step), command, status);
            return Err(CheckerError::CommandFailed {
                step,
                command,
                status,
            });
        }
        Ok(())
    }
}

fn step_tag(step: InstallStep) -> &'static str {
    match step {
        InstallStep::Installing => "INSTALL",
        InstallStep::Configuring => "CONFIGURE",
        InstallStep::Enabling | InstallStep::Restarting => "SERVICE",
    }
}
