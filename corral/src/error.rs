//! Error types for the corral library.
//!
//! This module provides the error hierarchy for all operations in the
//! corral library, using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Result type alias for operations that may fail with a corral error.
///
/// # Examples
///
/// ```
/// use corral::{Error, Result};
///
/// fn example_operation() -> Result<u64> {
///     Ok(7)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the corral library.
///
/// This enum encompasses all failure conditions of the reservation
/// lifecycle. The first four variants (`InvalidArgument`,
/// `IdentityUnavailable`, `PermissionDenied`, `NotFound`) are detected
/// before any mutation and leave all state untouched. `Persistence` is the
/// commit point of the deletion workflow: when it is returned, durable
/// state has not changed. `NetworkCleanup` and `Provisioning` occur after
/// the commit point: the reservation record is already gone, and the error
/// carries enough detail (reservation name, affected hosts) to re-run the
/// idempotent cleanup.
#[derive(Debug, Error)]
pub enum Error {
    /// A required argument was missing or malformed.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// The reason the argument is invalid.
        reason: String,
    },

    /// The calling user could not be determined from the environment.
    #[error("cannot determine calling user: {reason}")]
    IdentityUnavailable {
        /// Why identity resolution failed.
        reason: String,
    },

    /// The caller is not the owner of the reservation.
    #[error("user '{user}' is not the owner of reservation '{name}' (owner is '{owner}')")]
    PermissionDenied {
        /// The reservation name.
        name: String,
        /// The recorded owner.
        owner: String,
        /// The caller that was denied.
        user: String,
    },

    /// No reservation with the given name exists.
    #[error("no reservation named '{name}'")]
    NotFound {
        /// The name that was looked up.
        name: String,
    },

    /// A durable write of the store/grid failed.
    #[error("persistence error: {0}")]
    Persistence(#[from] rusqlite::Error),

    /// The network isolation backend reported an error.
    #[error("network cleanup failed for reservation '{name}': {details}")]
    NetworkCleanup {
        /// The reservation whose hosts could not be cleared.
        name: String,
        /// Hosts that failed, with per-host detail.
        details: String,
    },

    /// The boot provisioning backend reported an error.
    #[error("boot deprovisioning failed for reservation '{name}': {details}")]
    Provisioning {
        /// The reservation whose boot state could not be cleared.
        name: String,
        /// What failed.
        details: String,
    },

    /// A validation error occurred.
    #[error("validation error for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of the validation failure.
        message: String,
    },

    /// A node slot is already booked in the requested time slices.
    #[error("schedule conflict: {details}")]
    ScheduleConflict {
        /// Details about the conflicting cell.
        details: String,
    },

    /// A configuration error occurred.
    #[error("configuration error: {0}")]
    Configuration(#[from] serde_yaml::Error),

    /// A stored record could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<crate::reservation::ValidationError> for Error {
    fn from(err: crate::reservation::ValidationError) -> Self {
        Self::Validation {
            field: err.field,
            message: err.message,
        }
    }
}

impl Error {
    /// Check if this error was detected before any state mutation.
    ///
    /// Pre-mutation errors guarantee that both the in-memory and the
    /// durable store/grid are exactly as they were before the call.
    #[must_use]
    pub fn is_pre_mutation(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument { .. }
                | Self::IdentityUnavailable { .. }
                | Self::PermissionDenied { .. }
                | Self::NotFound { .. }
        )
    }

    /// Check if this error is recoverable by re-running cleanup.
    ///
    /// Recoverable errors occur after the persistence commit point; the
    /// reservation record is gone but physical cleanup is incomplete.
    /// Both backends are idempotent, so a reaper or operator re-run is
    /// safe.
    #[must_use]
    pub fn is_recoverable_cleanup(&self) -> bool {
        matches!(
            self,
            Self::NetworkCleanup { .. } | Self::Provisioning { .. }
        )
    }
}
