//! Utility functions for CLI operations.
//!
//! Shared plumbing for commands: resolving the data directory, opening the
//! database, loading configuration, and wiring the backends it selects.

use std::path::PathBuf;

use corral::backend::{BootProvisioner, NetworkIsolation};
use corral::{Config, Database, DatabaseConfig};

use crate::error::CliError;

/// Global CLI options shared across all commands.
#[derive(Debug, Clone)]
#[allow(dead_code)] // verbose is consumed by logger setup in main.rs
pub struct GlobalOptions {
    /// Enable verbose output.
    pub verbose: bool,

    /// Suppress non-essential output.
    pub quiet: bool,

    /// Override the data directory location.
    pub data_dir: Option<PathBuf>,

    /// Override the configuration file location.
    pub config: Option<PathBuf>,
}

/// Resolves the database path from global options.
pub fn resolve_database_path(global: &GlobalOptions) -> Result<PathBuf, CliError> {
    if let Some(data_dir) = &global.data_dir {
        return Ok(data_dir.join("corral.db"));
    }
    let home = home::home_dir()
        .ok_or_else(|| CliError::Config("could not determine home directory".to_string()))?;
    Ok(home.join(".corral").join("corral.db"))
}

/// Opens the database.
pub fn open_database(global: &GlobalOptions) -> Result<Database, CliError> {
    let path = resolve_database_path(global)?;
    Database::open(DatabaseConfig::new(path)).map_err(CliError::from)
}

/// Loads configuration, honoring the `--config` override.
pub fn load_configuration(global: &GlobalOptions) -> Result<Config, CliError> {
    corral::load_config(global.config.as_deref()).map_err(|e| CliError::Config(e.to_string()))
}

/// Builds the backends the configuration selects.
pub fn build_backends(
    config: &Config,
) -> Result<(Box<dyn NetworkIsolation>, Box<dyn BootProvisioner>), CliError> {
    let network = corral::network_from_config(&config.network);
    let boot = corral::boot_provisioner_from_config(&config.boot).map_err(CliError::from)?;
    Ok((network, boot))
}

/// Format a timestamp for display.
pub fn format_timestamp(ts: std::time::SystemTime) -> String {
    use chrono::{DateTime, Utc};
    let dt: DateTime<Utc> = ts.into();
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_database_path_override() {
        let global = GlobalOptions {
            verbose: false,
            quiet: false,
            data_dir: Some(PathBuf::from("/custom/dir")),
            config: None,
        };
        let path = resolve_database_path(&global).unwrap();
        assert_eq!(path, PathBuf::from("/custom/dir/corral.db"));
    }

    #[test]
    fn test_format_timestamp() {
        use std::time::{Duration, UNIX_EPOCH};
        let st = UNIX_EPOCH + Duration::from_secs(1705323045);
        let formatted = format_timestamp(st);
        assert!(formatted.contains("2024-01-15"));
    }
}
