//! Backends driven by the reservation lifecycle.
//!
//! Two external collaborators are abstracted here: network isolation
//! (per-host VLAN membership or similar) and boot provisioning. Both are
//! externally-owned, stateful resources: the scheduler issues commands to
//! them but holds no locks; their idempotence contracts are what make
//! retries and reaper re-runs safe.

pub mod boot_file;
pub mod external;
pub mod network;

use std::path::Path;

use crate::config::{BootConfig, BootMode, NetworkConfig};
use crate::error::{Error, Result};
use crate::reservation::Reservation;

pub use boot_file::BootFileProvisioner;
pub use external::{CommandService, ExternalServiceProvisioner, ProvisioningService, ServiceError};
pub use network::{CommandNetwork, NetworkError, NetworkIsolation, NoopNetwork};

/// Clears the boot configuration a reservation left behind.
///
/// Implementations must be idempotent: deprovisioning a reservation whose
/// boot state is already gone succeeds without error.
pub trait BootProvisioner {
    /// Removes the reservation's boot state (per-host configuration and
    /// any reservation-specific artifacts or profiles).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Provisioning`] when the backend cannot complete;
    /// the error names the reservation so cleanup can be re-run.
    fn deprovision(&self, reservation: &Reservation) -> Result<()>;
}

/// Builds the configured boot provisioner.
///
/// Variant selection happens here, once, at startup; the lifecycle engine
/// only ever sees the trait object.
///
/// # Errors
///
/// Returns a validation error if the External-Service variant is selected
/// without a default profile.
pub fn boot_provisioner_from_config(config: &BootConfig) -> Result<Box<dyn BootProvisioner>> {
    match config.mode {
        BootMode::BootFile => Ok(Box::new(BootFileProvisioner::new(config.root.clone()))),
        BootMode::ExternalService => {
            let default_profile =
                config
                    .default_profile
                    .clone()
                    .ok_or_else(|| Error::Validation {
                        field: "boot.default_profile".into(),
                        message: "external-service mode requires a default profile".into(),
                    })?;
            let service = std::sync::Arc::new(CommandService::new(&config.service_command));
            Ok(Box::new(ExternalServiceProvisioner::new(
                service,
                default_profile,
                config.reset_workers,
                std::time::Duration::from_secs(config.reset_timeout_secs),
            )))
        }
    }
}

/// Builds the configured network isolation backend.
#[must_use]
pub fn network_from_config(config: &NetworkConfig) -> Box<dyn NetworkIsolation> {
    match &config.clear_command {
        Some(command) if !command.is_empty() => Box::new(CommandNetwork::new(command.clone())),
        _ => Box::new(NoopNetwork),
    }
}

/// Removes the reservation's top-level boot-menu entry.
///
/// The entry (`<root>/pxelinux.cfg/corral/<name>`) marks that the
/// reservation exists; it is removed independent of the provisioning
/// variant. A missing entry is not an error.
///
/// # Errors
///
/// Returns an I/O error for failures other than the file being absent.
pub fn remove_boot_menu_entry(root: &Path, name: &str) -> std::io::Result<()> {
    remove_if_exists(&root.join("pxelinux.cfg").join("corral").join(name))
}

/// Removes a file, treating "already absent" as success.
pub(crate) fn remove_if_exists(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_variant_selection_boot_file() {
        let config = BootConfig::default();
        assert!(boot_provisioner_from_config(&config).is_ok());
    }

    #[test]
    fn test_variant_selection_external_requires_profile() {
        let config = BootConfig {
            mode: BootMode::ExternalService,
            ..BootConfig::default()
        };
        assert!(boot_provisioner_from_config(&config).is_err());

        let config = BootConfig {
            mode: BootMode::ExternalService,
            default_profile: Some("cluster-default".to_string()),
            ..BootConfig::default()
        };
        assert!(boot_provisioner_from_config(&config).is_ok());
    }

    #[test]
    fn test_network_selection() {
        let unconfigured = NetworkConfig::default();
        // Just exercises the selection path; NoopNetwork always succeeds.
        let backend = network_from_config(&unconfigured);
        assert!(backend.clear(&["n1".to_string()]).is_ok());
    }

    #[test]
    fn test_remove_if_exists_absent_ok() {
        let missing = PathBuf::from("/definitely/not/a/real/path");
        assert!(remove_if_exists(&missing).is_ok());
    }

    #[test]
    fn test_remove_boot_menu_entry() {
        let dir = tempfile::tempdir().unwrap();
        let entry_dir = dir.path().join("pxelinux.cfg").join("corral");
        std::fs::create_dir_all(&entry_dir).unwrap();
        let entry = entry_dir.join("resA");
        std::fs::write(&entry, "menu").unwrap();

        remove_boot_menu_entry(dir.path(), "resA").unwrap();
        assert!(!entry.exists());

        // Removing again is fine.
        remove_boot_menu_entry(dir.path(), "resA").unwrap();
    }
}
