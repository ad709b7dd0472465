//! Configuration schema definitions.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Which boot-provisioning variant the scheduler drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BootMode {
    /// Write/remove per-host boot-configuration files on the boot root.
    #[default]
    BootFile,
    /// Delegate per-host boot profiles to an external provisioning service.
    ExternalService,
}

/// Boot provisioning settings.
///
/// # Examples
///
/// ```
/// use corral::config::{BootConfig, BootMode};
///
/// let config = BootConfig::default();
/// assert_eq!(config.mode, BootMode::BootFile);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct BootConfig {
    /// Variant selection; fixed at startup, never both.
    pub mode: BootMode,

    /// Root of the boot configuration directory tree.
    pub root: PathBuf,

    /// The cluster's shared/default profile hosts are reset to on
    /// deletion. Required for the External-Service variant.
    pub default_profile: Option<String>,

    /// The provisioning-service command to invoke (External-Service only).
    pub service_command: String,

    /// Maximum concurrent per-host reset tasks (External-Service only).
    pub reset_workers: usize,

    /// Seconds to wait between per-host reset completions before giving
    /// up on the fan-out (External-Service only).
    pub reset_timeout_secs: u64,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            mode: BootMode::BootFile,
            root: PathBuf::from("/srv/tftp"),
            default_profile: None,
            service_command: "cobbler".to_string(),
            reset_workers: 8,
            reset_timeout_secs: 300,
        }
    }
}

/// Network isolation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields, default)]
pub struct NetworkConfig {
    /// Command (program plus leading arguments) run once per host to clear
    /// its isolation. Unset means isolation is not managed here.
    pub clear_command: Option<Vec<String>>,
}

/// Complete configuration structure.
///
/// # Examples
///
/// ```
/// use corral::Config;
///
/// let config = Config::default();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    /// Boot provisioning settings.
    pub boot: BootConfig,

    /// Network isolation settings.
    pub network: NetworkConfig,
}

impl Config {
    /// Checks cross-field requirements that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the External-Service variant is
    /// selected without a default profile, or if tuning values are zero.
    pub fn validate(&self) -> Result<()> {
        if self.boot.mode == BootMode::ExternalService && self.boot.default_profile.is_none() {
            return Err(Error::Validation {
                field: "boot.default_profile".into(),
                message: "external-service mode requires a default profile".into(),
            });
        }
        if self.boot.reset_workers == 0 {
            return Err(Error::Validation {
                field: "boot.reset_workers".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.boot.reset_timeout_secs == 0 {
            return Err(Error::Validation {
                field: "boot.reset_timeout_secs".into(),
                message: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}
