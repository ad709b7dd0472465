//! Reap command implementation.
//!
//! Deletes every reservation whose time window has elapsed, bypassing the
//! ownership check. Intended to run from cron or a supervisor; re-running
//! after a partial failure is safe because backend cleanup is idempotent.

use clap::Args;
use corral::{LifecycleEngine, ReapOptions};

use crate::error::CliError;
use crate::utils::{build_backends, load_configuration, open_database, GlobalOptions};

/// Delete reservations whose time window has elapsed.
#[derive(Args)]
pub struct ReapCommand {
    /// Report what would be removed without removing anything
    #[arg(long)]
    pub dry_run: bool,
}

impl ReapCommand {
    /// Execute the reap command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let mut db = open_database(global)?;
        let (network, boot) = build_backends(&config)?;

        let mut engine =
            LifecycleEngine::new(&mut db, network.as_ref(), boot.as_ref(), config.boot.root);

        let options = ReapOptions::new().with_dry_run(self.dry_run);
        let result = engine.reap(&options)?;

        if !global.quiet {
            if self.dry_run {
                eprintln!("Dry run - would reap {} reservation(s):", result.removed.len());
                for reservation in &result.removed {
                    eprintln!("  {} (owner {})", reservation.name(), reservation.owner());
                }
            } else {
                for reservation in &result.removed {
                    eprintln!("Reaped '{}' (owner {})", reservation.name(), reservation.owner());
                }
                eprintln!("Reaped {} reservation(s)", result.removed.len());
            }
            for (name, error) in &result.failures {
                eprintln!("Warning: reaping '{name}' failed: {error}");
            }
        }

        // Partial failures exit non-zero so a supervisor notices; the
        // failed reservations stay expired and retry on the next sweep.
        match result.failures.into_iter().next() {
            Some((_, error)) => Err(CliError::Library(error)),
            None => Ok(()),
        }
    }
}
