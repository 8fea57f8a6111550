//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Litter box activity monitor.
///
/// Pulls the robot's cloud history, keeps an append-only activity log, and
/// messages the household when a day's numbers look wrong.
#[derive(Debug, Parser)]
#[command(name = "lr4", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Review yesterday's activity: log it and alert on anomalies.
    Review,

    /// Append today's activity to the log without alerting.
    Sync,
}
