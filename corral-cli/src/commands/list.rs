//! List command implementation.

use clap::Args;
use serde_json::json;

use crate::error::CliError;
use crate::utils::{format_timestamp, open_database, GlobalOptions};

/// List active reservations and grid occupancy.
#[derive(Args)]
pub struct ListCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show the audit log instead of active reservations
    #[arg(long)]
    pub audit: bool,
}

impl ListCommand {
    /// Execute the list command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let db = open_database(global)?;

        if self.audit {
            return self.list_audit(&db, global);
        }

        let state = db.load_state()?;

        if self.json {
            let mut reservations: Vec<_> = state.store.iter().collect();
            reservations.sort_by_key(|r| r.id());
            let output = json!({
                "reservations": reservations,
                "grid": state.grid,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&output)
                    .map_err(|e| CliError::Config(format!("failed to encode listing: {e}")))?
            );
            return Ok(());
        }

        if state.store.is_empty() {
            if !global.quiet {
                println!("No active reservations");
            }
            return Ok(());
        }

        let mut reservations: Vec<_> = state.store.iter().collect();
        reservations.sort_by_key(|r| r.id());

        println!(
            "{:<6} {:<20} {:<12} {:<24} {}",
            "ID", "NAME", "OWNER", "ENDS", "HOSTS"
        );
        for reservation in reservations {
            let cells = state.grid.occupancy(reservation.id()).len();
            println!(
                "{:<6} {:<20} {:<12} {:<24} {} ({cells} grid cells)",
                reservation.id(),
                reservation.name(),
                reservation.owner(),
                format_timestamp(reservation.end_at()),
                reservation.hosts().join(",")
            );
        }

        Ok(())
    }

    fn list_audit(&self, db: &corral::Database, global: &GlobalOptions) -> Result<(), CliError> {
        let events = db.list_audit()?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&events)
                    .map_err(|e| CliError::Config(format!("failed to encode audit log: {e}")))?
            );
            return Ok(());
        }

        if events.is_empty() {
            if !global.quiet {
                println!("Audit log is empty");
            }
            return Ok(());
        }

        for event in events {
            println!(
                "{} {:<8} {} (id {}, owner {})",
                format_timestamp(event.at),
                event.kind,
                event.reservation.name(),
                event.reservation.id(),
                event.reservation.owner()
            );
        }

        Ok(())
    }
}
