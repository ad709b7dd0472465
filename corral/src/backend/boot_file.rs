//! The Boot-File provisioning variant.
//!
//! Boot configuration lives as files under a TFTP-style root: one
//! boot-config file per host under `pxelinux.cfg/`, and the reservation's
//! generated kernel and initrd under `corral/`. Deprovisioning removes
//! them all, best-effort, since a file may already be absent.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::reservation::Reservation;

use super::{remove_if_exists, BootProvisioner};

/// Removes a reservation's generated boot-configuration files.
pub struct BootFileProvisioner {
    root: PathBuf,
}

impl BootFileProvisioner {
    /// Creates a provisioner rooted at the boot configuration tree.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

impl BootProvisioner for BootFileProvisioner {
    fn deprovision(&self, reservation: &Reservation) -> Result<()> {
        let mut failures = Vec::new();

        // Per-host boot-config files.
        for artifact in reservation.boot_artifacts() {
            let path = self.root.join("pxelinux.cfg").join(artifact);
            if let Err(e) = remove_if_exists(&path) {
                failures.push(format!("{}: {e}", path.display()));
            }
        }

        // The now-unused kernel and initrd generated for the reservation.
        for suffix in ["kernel", "initrd"] {
            let path = self
                .root
                .join("corral")
                .join(format!("{}-{suffix}", reservation.name()));
            if let Err(e) = remove_if_exists(&path) {
                failures.push(format!("{}: {e}", path.display()));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::Provisioning {
                name: reservation.name().to_string(),
                details: failures.join("; "),
            })
        }
    }
}
