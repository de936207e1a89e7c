//! # auth-checker - CLI Entry Point
//!
//! Prints the failed-login rate of the auth log and, with
//! `--setup-fail2ban`, offers to install fail2ban when the rate is high.

use clap::Parser;
use log::info;
use std::path::PathBuf;

use auth_checker::pipeline::{run_check, RunOutcome};
use auth_checker::response::prompt::LinePrompt;
use auth_checker::response::runner::SystemRunner;
use auth_checker::{CheckerConfig, CheckerError, CheckerResult};

/// auth-checker - failed-login rate check with optional fail2ban setup.
#[derive(Parser, Debug)]
#[command(name = "auth-checker")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Offer to install and configure fail2ban when the rate is too high.
    #[arg(long)]
    setup_fail2ban: bool,

    /// Path to configuration file. Defaults are used when it does not exist.
    #[arg(short, long, default_value = "auth-checker.toml")]
    config: PathBuf,

    /// Auth log to scan, overriding the configuration.
    #[arg(long)]
    log_path: Option<PathBuf>,

    /// Write the default configuration to --config and exit.
    #[arg(long)]
    init_config: bool,
}

fn main() -> CheckerResult<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.init_config {
        return cmd_init_config(&cli);
    }

    let mut config = if cli.config.exists() {
        info!("Loading configuration from: {}", cli.config.display());
        CheckerConfig::from_file(&cli.config)?
    } else {
        CheckerConfig::default()
    };
    if let Some(path) = cli.log_path {
        config.general.log_path = path;
    }

    let mut stdout = std::io::stdout();
    let mut prompt = LinePrompt::stdio();
    let mut runner = SystemRunner;
    let outcome = run_check(
        &config,
        cli.setup_fail2ban,
        &mut stdout,
        &mut prompt,
        &mut runner,
    )?;

    match outcome {
        RunOutcome::Installed { .. } => info!("fail2ban setup complete"),
        other => info!("Finished: {:?}", other),
    }
    Ok(())
}

/// Generate a default configuration file.
fn cmd_init_config(cli: &Cli) -> CheckerResult<()> {
    if cli.config.exists() {
        return Err(CheckerError::Config(format!(
            "Configuration file already exists: {}. Remove it first or use a different path.",
            cli.config.display()
        )));
    }

    CheckerConfig::write_default(&cli.config)?;
    println!("Default configuration written to: {}", cli.config.display());
    println!("  [general]   - log_path of the auth log to scan");
    println!("  [installer] - package/service commands and jail_path");
    println!("  [jail]      - sshd jail written on setup");
    Ok(())
}
