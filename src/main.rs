//! pcimaxctl - PCI MAX FM transmitter control
//!
//! Tunes the card, sets its power level, switches the stereo encoder and
//! transmitter, and programs RDS data.
//!
//! # Architecture
//!
//! The tool is a thin layer over `pcimaxfm-core`:
//! - a **backend** finds cards and provides port access (`/dev/port` on
//!   Linux, or an emulated card for testing)
//! - each invocation attaches the selected card, opens it once, applies
//!   every requested setting in order through the ioctl-style command table
//!   and detaches again
//!
//! Frequency and power cannot be read back from the hardware, so they only
//! show values set within the same invocation, and setting either needs the
//! other. Transmitter and stereo state survive detach and are picked up
//! again at attach.

mod backends;
mod cli;
mod commands;

use backends::Session;
use clap::Parser;
use cli::{Cli, Commands};
use commands::Notices;
use pcimaxfm_core::card::Privilege;
use pcimaxfm_core::config::DriverConfig;

use std::path::{Path, PathBuf};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match (cli.quiet, cli.verbose) {
        (true, _) => log::set_max_level(log::LevelFilter::Error),
        (false, 0) => {} // default (info)
        (false, 1) => log::set_max_level(log::LevelFilter::Debug),
        (false, _) => log::set_max_level(log::LevelFilter::Trace),
    }

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Some(Commands::List) => return commands::list_cards(&cli.backend),
        Some(Commands::RdsParams) => {
            commands::rds::list_params();
            return Ok(());
        }
        _ => {}
    }

    // Reject bad input before touching the card
    cli.actions.check_pll()?;
    let assignments = commands::rds::parse_assignments(&cli.actions.rds)?;

    let session = Session::attach(&cli.backend, config, cli.card)?;
    let file = session.card().open(Privilege::User)?;
    let mut out = Notices::new(std::io::stdout().lock(), cli.quiet);

    commands::apply(&file, &cli.actions, &assignments, &mut out)?;

    if matches!(cli.command, Some(Commands::Status)) || cli.actions.is_empty() {
        commands::status::cmd_status(&file, &mut out)?;
    }
    Ok(())
}

/// Load the driver configuration from the specified path or default locations
fn load_config(path: Option<&Path>) -> Result<DriverConfig, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        // User specified a path
        let config = DriverConfig::load(path)?;
        log::debug!("Loaded configuration from {}", path.display());
        return Ok(config);
    }

    let default_paths = [
        PathBuf::from("/etc/pcimaxfm.toml"),
        PathBuf::from("/usr/local/etc/pcimaxfm.toml"),
    ];

    for file in &default_paths {
        if file.is_file() {
            match DriverConfig::load(file) {
                Ok(config) => {
                    log::debug!("Loaded configuration from {}", file.display());
                    return Ok(config);
                }
                Err(e) => {
                    log::warn!("Failed to load {}: {}", file.display(), e);
                }
            }
        }
    }

    Ok(DriverConfig::default())
}
