//! The deletion workflow.
//!
//! A linear pipeline with no branching back: validate, resolve caller
//! identity, locate and authorize, remove from the store, purge the grid,
//! persist both records as one unit, deprovision network isolation,
//! deprovision boot configuration, audit. The persistence step is the
//! single commit point: failures before it leave all state untouched,
//! failures after it are recoverable by re-running the idempotent
//! cleanup.

use std::path::PathBuf;

use crate::audit::AuditKind;
use crate::backend::{remove_boot_menu_entry, BootProvisioner, NetworkIsolation};
use crate::database::Database;
use crate::error::{Error, Result};
use crate::identity;
use crate::reservation::Reservation;

/// Options for a delete operation.
///
/// `check_user` is `true` for an interactive, authenticated request and
/// `false` for the expiry reaper, which deletes regardless of the caller's
/// identity.
///
/// # Examples
///
/// ```
/// use corral::DeleteOptions;
///
/// let options = DeleteOptions::new("resA");
/// assert!(options.check_user);
/// ```
#[derive(Debug, Clone)]
pub struct DeleteOptions {
    /// The reservation name to delete.
    pub name: String,

    /// Whether to require the caller to be the recorded owner.
    pub check_user: bool,

    /// Caller identity override; `None` resolves from the environment.
    pub caller: Option<String>,
}

impl DeleteOptions {
    /// Creates options for deleting `name` with the ownership check on.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            check_user: true,
            caller: None,
        }
    }

    /// Sets whether the ownership check runs.
    #[must_use]
    pub const fn with_check_user(mut self, check_user: bool) -> Self {
        self.check_user = check_user;
        self
    }

    /// Overrides caller identity instead of resolving it from the
    /// environment.
    #[must_use]
    pub fn with_caller(mut self, caller: impl Into<String>) -> Self {
        self.caller = Some(caller.into());
        self
    }
}

/// Result of a successful deletion.
#[derive(Debug, Clone)]
pub struct DeletedReservation {
    /// Snapshot of the reservation as it was removed.
    pub reservation: Reservation,

    /// Number of grid cells freed.
    pub cells_cleared: usize,
}

/// Orchestrates the reservation lifecycle against the persistence layer
/// and the two deprovisioning backends.
///
/// The engine borrows its collaborators; nothing here is a global. Each
/// operation loads the persisted state fresh, mutates it in memory, and
/// writes it back; the database's locking makes the read-mutate-persist
/// sequence safe against concurrent invocations.
pub struct LifecycleEngine<'a> {
    db: &'a mut Database,
    network: &'a dyn NetworkIsolation,
    boot: &'a dyn BootProvisioner,
    boot_root: PathBuf,
}

impl<'a> LifecycleEngine<'a> {
    /// Creates an engine over the given database and backends.
    ///
    /// `boot_root` is the boot configuration tree holding the per-
    /// reservation menu entries removed on every deletion.
    #[must_use]
    pub fn new(
        db: &'a mut Database,
        network: &'a dyn NetworkIsolation,
        boot: &'a dyn BootProvisioner,
        boot_root: PathBuf,
    ) -> Self {
        Self {
            db,
            network,
            boot,
            boot_root,
        }
    }

    /// Returns the database the engine operates on.
    #[must_use]
    pub fn database(&self) -> &Database {
        &*self.db
    }

    /// Deletes the named reservation.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`]: the name is empty. No state touched.
    /// - [`Error::IdentityUnavailable`]: the caller cannot be resolved.
    ///   No state touched.
    /// - [`Error::NotFound`]: no reservation has this name. No state
    ///   touched.
    /// - [`Error::PermissionDenied`]: `check_user` is set and the caller
    ///   is not the recorded owner. No state touched.
    /// - [`Error::Persistence`]: the durable write failed; the removal
    ///   was not committed and the previous state is still on disk.
    /// - [`Error::NetworkCleanup`] / [`Error::Provisioning`]: the record
    ///   is gone but physical cleanup is incomplete; the error names the
    ///   reservation and hosts so cleanup can be re-run.
    pub fn delete_reservation(&mut self, options: &DeleteOptions) -> Result<DeletedReservation> {
        // Step 1: validate.
        let name = options.name.trim();
        if name.is_empty() {
            return Err(Error::InvalidArgument {
                reason: "exactly one reservation name is required".into(),
            });
        }

        // Step 2: resolve caller identity. An unresolvable identity is an
        // environment failure even when the ownership check is off.
        let caller = match &options.caller {
            Some(caller) => caller.clone(),
            None => identity::current_user()?,
        };

        // Steps 3-6 form one exclusive critical section: a concurrent
        // invocation blocks at its own begin_update until this one
        // commits, so nobody mutates a stale snapshot of the records.
        let tx = self.db.begin_update()?;
        let mut state = tx.load_state()?;

        // One scan locates the reservation, then authorizes against it.
        let reservation = state
            .store
            .lookup_by_name(name)
            .ok_or_else(|| Error::NotFound {
                name: name.to_string(),
            })?;
        if options.check_user && reservation.owner() != caller {
            return Err(Error::PermissionDenied {
                name: name.to_string(),
                owner: reservation.owner().to_string(),
                user: caller,
            });
        }

        let id = reservation.id();
        let snapshot = state.store.remove(id).ok_or_else(|| Error::NotFound {
            name: name.to_string(),
        })?;

        // Step 5: purge the schedule grid.
        let cells_cleared = state.grid.clear(id);

        // Step 6: persist both records as one unit. This is the commit
        // point; an error here means durable state is unchanged.
        tx.save_state(&state)?;
        tx.commit()?;
        log::debug!(
            "removed reservation '{}' (id {id}), freed {cells_cleared} grid cells",
            snapshot.name()
        );

        // Step 7: clear network isolation on the captured hosts.
        self.network
            .clear(snapshot.hosts())
            .map_err(|e| Error::NetworkCleanup {
                name: snapshot.name().to_string(),
                details: e.to_string(),
            })?;

        // Step 8: deprovision boot configuration, then drop the menu
        // entry. The entry is removed even when the backend fails so the
        // reservation stops being advertised; the backend error wins.
        let boot_result = self.boot.deprovision(&snapshot);
        let menu_result = remove_boot_menu_entry(&self.boot_root, snapshot.name());
        boot_result?;
        menu_result.map_err(|e| Error::Provisioning {
            name: snapshot.name().to_string(),
            details: format!("removing boot menu entry: {e}"),
        })?;

        // Step 9: audit. Runs only when every earlier step succeeded.
        self.db.append_audit(AuditKind::Deleted, &snapshot)?;

        Ok(DeletedReservation {
            reservation: snapshot,
            cells_cleared,
        })
    }
}
