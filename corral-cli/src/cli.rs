//! CLI structure and command definitions.

use crate::commands::{
    CompletionsCommand, DelCommand, InitCommand, ListCommand, ReapCommand, ShowDataDirCommand,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line tool for scheduling testbed node reservations.
#[derive(Parser)]
#[command(name = "corral")]
#[command(version, about = "Schedule testbed node reservations", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Override the data directory location
    #[arg(long, value_name = "PATH", global = true, env = "CORRAL_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Override the configuration file location
    #[arg(long, value_name = "PATH", global = true, env = "CORRAL_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Delete a reservation
    Del(DelCommand),

    /// Delete reservations whose time window has elapsed
    Reap(ReapCommand),

    /// List active reservations and grid occupancy
    List(ListCommand),

    /// Create an empty schedule grid
    Init(InitCommand),

    /// Print the data directory location
    ShowDataDir(ShowDataDirCommand),

    /// Generate shell completion scripts
    Completions(CompletionsCommand),
}
