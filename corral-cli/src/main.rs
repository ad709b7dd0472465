//! Main entry point for the corral CLI.
//!
//! Command-line interface for the corral testbed-reservation scheduler:
//! - `del`: delete a reservation
//! - `reap`: delete reservations whose time window has elapsed
//! - `list`: list active reservations and grid occupancy
//! - `init`: create an empty schedule grid

mod cli;
mod commands;
mod error;
mod utils;

use clap::Parser;
use cli::Cli;
use utils::GlobalOptions;

fn main() {
    let cli = Cli::parse();

    let _logger = corral::init_logger(cli.verbose, cli.quiet);

    let global = GlobalOptions {
        verbose: cli.verbose,
        quiet: cli.quiet,
        data_dir: cli.data_dir,
        config: cli.config,
    };

    let result = match cli.command {
        cli::Command::Del(cmd) => cmd.execute(&global),
        cli::Command::Reap(cmd) => cmd.execute(&global),
        cli::Command::List(cmd) => cmd.execute(&global),
        cli::Command::Init(cmd) => cmd.execute(&global),
        cli::Command::ShowDataDir(cmd) => cmd.execute(&global),
        cli::Command::Completions(cmd) => cmd.execute(&global),
    };

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
