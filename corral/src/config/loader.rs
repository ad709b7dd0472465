//! Configuration loading.
//!
//! Resolution order for the config file path: an explicit path from the
//! caller, then `$CORRAL_CONFIG`, then `~/.corral/config.yaml`. A missing
//! file yields the built-in defaults; a present but malformed file is an
//! error.

use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

use super::schema::Config;

/// Resolves the configuration file path.
///
/// # Errors
///
/// Returns an error if no explicit path or `CORRAL_CONFIG` is given and
/// the home directory cannot be determined.
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Ok(path) = env::var("CORRAL_CONFIG") {
        return Ok(PathBuf::from(path));
    }
    let home = home::home_dir().ok_or_else(|| Error::Validation {
        field: "home_directory".into(),
        message: "cannot determine home directory".into(),
    })?;
    Ok(home.join(".corral").join("config.yaml"))
}

/// Loads and validates configuration.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed, or
/// if cross-field validation fails.
///
/// # Examples
///
/// ```no_run
/// use corral::config::load_config;
///
/// let config = load_config(None).unwrap();
/// println!("boot root: {}", config.boot.root.display());
/// ```
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let path = resolve_config_path(explicit)?;
    let config = if path.exists() {
        let contents = std::fs::read_to_string(&path)?;
        let parsed: Config = serde_yaml::from_str(&contents)?;
        log::debug!("loaded configuration from {}", path.display());
        parsed
    } else {
        log::debug!("no configuration at {}, using defaults", path.display());
        Config::default()
    };
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_explicit_path_wins() {
        let path = resolve_config_path(Some(Path::new("/etc/corral.yaml"))).unwrap();
        assert_eq!(path, PathBuf::from("/etc/corral.yaml"));
    }

    #[test]
    #[serial]
    fn test_env_path() {
        let saved = env::var("CORRAL_CONFIG").ok();
        env::set_var("CORRAL_CONFIG", "/custom/config.yaml");

        let path = resolve_config_path(None).unwrap();
        assert_eq!(path, PathBuf::from("/custom/config.yaml"));

        match saved {
            Some(v) => env::set_var("CORRAL_CONFIG", v),
            None => env::remove_var("CORRAL_CONFIG"),
        }
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_parses_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "boot:\n  root: /var/lib/boot").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.boot.root, PathBuf::from("/var/lib/boot"));
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "boot: [not, a, mapping]").unwrap();

        assert!(load_config(Some(&path)).is_err());
    }

    #[test]
    fn test_load_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "boot:\n  mode: external-service").unwrap();

        // Parses, but fails cross-field validation.
        assert!(load_config(Some(&path)).is_err());
    }
}
