//! Show-data-dir command implementation.

use clap::Args;

use crate::error::CliError;
use crate::utils::{resolve_database_path, GlobalOptions};

/// Print the data directory location.
#[derive(Args)]
pub struct ShowDataDirCommand {}

impl ShowDataDirCommand {
    /// Execute the show-data-dir command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let db_path = resolve_database_path(global)?;
        match db_path.parent() {
            Some(dir) => println!("{}", dir.display()),
            None => println!("{}", db_path.display()),
        }
        Ok(())
    }
}
