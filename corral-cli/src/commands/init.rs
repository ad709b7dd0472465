//! Init command implementation.

use clap::Args;
use corral::{ReservationStore, ScheduleGrid, SchedulerState};

use crate::error::CliError;
use crate::utils::{open_database, GlobalOptions};

/// Create an empty schedule grid.
#[derive(Args)]
pub struct InitCommand {
    /// Number of time slices in the schedule
    #[arg(long, value_name = "N")]
    pub slices: usize,

    /// Number of physical nodes per slice
    #[arg(long, value_name = "N")]
    pub nodes: usize,

    /// Replace an existing grid even if reservations are active
    #[arg(long)]
    pub force: bool,
}

impl InitCommand {
    /// Execute the init command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        if self.slices == 0 || self.nodes == 0 {
            return Err(CliError::InvalidArguments(
                "--slices and --nodes must both be at least 1".to_string(),
            ));
        }

        let mut db = open_database(global)?;
        let existing = db.load_state()?;
        if !existing.store.is_empty() && !self.force {
            return Err(CliError::InvalidArguments(format!(
                "{} reservation(s) are active; use --force to discard them",
                existing.store.len()
            )));
        }

        let state = SchedulerState {
            store: ReservationStore::new(),
            grid: ScheduleGrid::new(self.slices, self.nodes),
        };
        db.save_state(&state)?;

        if !global.quiet {
            eprintln!(
                "Initialized schedule grid: {} slices x {} nodes",
                self.slices, self.nodes
            );
        }

        Ok(())
    }
}
