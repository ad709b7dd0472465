//! Delete command implementation.
//!
//! Deletes an existing reservation. The caller must be the recorded owner;
//! expiry-driven deletion without the ownership check lives in `reap`.

use clap::Args;
use corral::{DeleteOptions, LifecycleEngine};

use crate::error::CliError;
use crate::utils::{build_backends, load_configuration, open_database, GlobalOptions};

/// Delete a reservation.
#[derive(Args)]
pub struct DelCommand {
    /// Name of the reservation to delete
    pub name: String,
}

impl DelCommand {
    /// Execute the del command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let mut db = open_database(global)?;
        let (network, boot) = build_backends(&config)?;

        let mut engine =
            LifecycleEngine::new(&mut db, network.as_ref(), boot.as_ref(), config.boot.root);

        let options = DeleteOptions::new(&self.name);
        let deleted = engine.delete_reservation(&options)?;

        if !global.quiet {
            eprintln!(
                "Deleted reservation '{}' (freed {})",
                deleted.reservation.name(),
                deleted.reservation.hosts().join(", ")
            );
        }

        Ok(())
    }
}
