//! CLI argument parsing

use crate::backends;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Parse an on/off switch argument
fn parse_switch(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "on" | "1" | "yes" => Ok(true),
        "off" | "0" | "no" => Ok(false),
        _ => Err(format!("expected on, off, 1 or 0, got '{}'", s)),
    }
}

/// Generate dynamic help text for the backend argument
fn backend_help() -> String {
    format!(
        "Hardware access backend [available: {}]",
        backends::backend_names_short()
    )
}

#[derive(Parser)]
#[command(name = "pcimaxctl")]
#[command(author, version, about = "PCI MAX FM transmitter control", long_about = None)]
#[command(after_help = "Omitting an optional value prints the current setting.")]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// No output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Driver configuration file (TOML format)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, default_value = backends::DEFAULT_BACKEND, help = backend_help())]
    pub backend: String,

    /// Card number
    #[arg(short, long, global = true, default_value_t = 0)]
    pub card: usize,

    #[command(flatten)]
    pub actions: Actions,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Settings applied in one invocation, in field order
#[derive(Args, Debug, Default)]
pub struct Actions {
    /// Get or set the frequency in MHz (86.00 - 108.00)
    #[arg(short, long, value_name = "MHZ", num_args = 0..=1)]
    pub freq: Option<Option<f64>>,

    /// Get or set the power level (0 - 15)
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        num_args = 0..=1,
        value_parser = clap::value_parser!(u8).range(0..=15)
    )]
    pub power: Option<Option<u8>>,

    /// Get or switch the stereo encoder (on, off, 1 or 0)
    #[arg(short, long, value_name = "STATE", num_args = 0..=1, value_parser = parse_switch)]
    pub stereo: Option<Option<bool>>,

    /// Get or switch the transmitter (on, off, 1 or 0)
    #[arg(short, long, value_name = "STATE", num_args = 0..=1, value_parser = parse_switch)]
    pub tx: Option<Option<bool>>,

    /// Get or switch the RDS signal (on, off, 1 or 0)
    #[arg(long, value_name = "STATE", num_args = 0..=1, value_parser = parse_switch)]
    pub rds_signal: Option<Option<bool>>,

    /// Set RDS parameters, PARAM=VALUE pairs, comma-separated (see rds-params)
    #[arg(short, long, value_name = "PARAM=VALUE", value_delimiter = ',')]
    pub rds: Vec<String>,
}

impl Actions {
    /// Whether anything was asked of the card
    pub fn is_empty(&self) -> bool {
        self.freq.is_none()
            && self.power.is_none()
            && self.stereo.is_none()
            && self.tx.is_none()
            && self.rds_signal.is_none()
            && self.rds.is_empty()
    }

    /// Frequency and power go to the PLL in one frame, and neither can be
    /// read back from the card, so setting one needs the other
    pub fn check_pll(&self) -> Result<(), String> {
        match (self.freq, self.power) {
            (Some(Some(_)), Some(Some(_))) => Ok(()),
            (Some(Some(_)), _) => Err("setting the frequency needs --power LEVEL as well".into()),
            (_, Some(Some(_))) => Err("setting the power level needs --freq MHZ as well".into()),
            _ => Ok(()),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List detected cards
    List,

    /// Show the card status
    Status,

    /// List RDS parameters
    RdsParams,
}
