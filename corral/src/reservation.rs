//! Reservation types for tracking node allocations.
//!
//! This module provides the `Reservation` value type (a named, owned,
//! time-bounded grant of a set of physical nodes) along with a builder
//! for validated construction.

use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

/// A named, owned, time-bounded grant of a set of physical nodes.
///
/// The identifier is a non-zero integer; `0` is reserved as the sentinel
/// for "no reservation" in schedule-grid cells. Names are unique among
/// active reservations and serve as the user-facing handle.
///
/// # Examples
///
/// ```
/// use corral::Reservation;
///
/// let reservation = Reservation::builder(7, "resA", "alice")
///     .hosts(vec!["n1".to_string(), "n2".to_string()])
///     .boot_artifacts(vec!["01-aa-bb".to_string(), "01-cc-dd".to_string()])
///     .build()
///     .unwrap();
///
/// assert_eq!(reservation.id(), 7);
/// assert_eq!(reservation.owner(), "alice");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    id: u64,
    name: String,
    owner: String,
    hosts: Vec<String>,
    boot_artifacts: Vec<String>,
    external_profile: Option<String>,
    start_at: SystemTime,
    end_at: SystemTime,
}

impl Reservation {
    /// Creates a new reservation builder.
    ///
    /// # Examples
    ///
    /// ```
    /// use corral::Reservation;
    ///
    /// let reservation = Reservation::builder(1, "test", "alice").build().unwrap();
    /// assert_eq!(reservation.name(), "test");
    /// ```
    #[must_use]
    pub fn builder(id: u64, name: impl Into<String>, owner: impl Into<String>) -> ReservationBuilder {
        ReservationBuilder {
            id,
            name: name.into(),
            owner: owner.into(),
            hosts: Vec::new(),
            boot_artifacts: Vec::new(),
            external_profile: None,
            start_at: None,
            end_at: None,
        }
    }

    /// Returns the reservation identifier.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Returns the reservation name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the owner username.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Returns the hostnames currently bound to this reservation.
    #[must_use]
    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    /// Returns the per-host boot artifact names.
    ///
    /// These identify the generated boot-configuration files for the
    /// Boot-File provisioning variant. When non-empty, there is one entry
    /// per host in [`hosts`](Self::hosts), in the same order.
    #[must_use]
    pub fn boot_artifacts(&self) -> &[String] {
        &self.boot_artifacts
    }

    /// Returns the dedicated provisioning-service profile, if any.
    ///
    /// `None` means the reservation boots from the cluster's shared
    /// default profile and there is nothing reservation-specific to delete
    /// on the provisioning service.
    #[must_use]
    pub fn external_profile(&self) -> Option<&str> {
        self.external_profile.as_deref()
    }

    /// Returns the start of the granted time window.
    #[must_use]
    pub const fn start_at(&self) -> SystemTime {
        self.start_at
    }

    /// Returns the end of the granted time window.
    #[must_use]
    pub const fn end_at(&self) -> SystemTime {
        self.end_at
    }

    /// Checks whether the reservation's time window has elapsed at `now`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::{Duration, SystemTime};
    /// use corral::Reservation;
    ///
    /// let reservation = Reservation::builder(1, "test", "alice").build().unwrap();
    /// // A freshly built reservation defaults to a one-hour window.
    /// assert!(!reservation.is_expired(SystemTime::now()));
    /// ```
    #[must_use]
    pub fn is_expired(&self, now: SystemTime) -> bool {
        self.end_at <= now
    }
}

/// Default window length when a builder does not set one explicitly.
const DEFAULT_WINDOW: Duration = Duration::from_secs(60 * 60);

/// Builder for creating `Reservation` instances.
///
/// The builder validates the invariants a reservation must satisfy before
/// it can be inserted into the store: non-zero identifier, non-empty
/// trimmed name and owner, and, when boot artifacts are present, one
/// artifact per host.
#[derive(Debug)]
pub struct ReservationBuilder {
    id: u64,
    name: String,
    owner: String,
    hosts: Vec<String>,
    boot_artifacts: Vec<String>,
    external_profile: Option<String>,
    start_at: Option<SystemTime>,
    end_at: Option<SystemTime>,
}

impl ReservationBuilder {
    /// Sets the hostnames bound to the reservation.
    #[must_use]
    pub fn hosts(mut self, hosts: Vec<String>) -> Self {
        self.hosts = hosts;
        self
    }

    /// Sets the per-host boot artifact names.
    #[must_use]
    pub fn boot_artifacts(mut self, artifacts: Vec<String>) -> Self {
        self.boot_artifacts = artifacts;
        self
    }

    /// Sets the dedicated provisioning-service profile name.
    #[must_use]
    pub fn external_profile(mut self, profile: Option<String>) -> Self {
        self.external_profile = profile;
        self
    }

    /// Sets the granted time window.
    #[must_use]
    pub fn window(mut self, start_at: SystemTime, end_at: SystemTime) -> Self {
        self.start_at = Some(start_at);
        self.end_at = Some(end_at);
        self
    }

    /// Builds the reservation.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The identifier is `0` (reserved as the free-cell sentinel)
    /// - The name or owner is empty after trimming
    /// - Boot artifacts are present but their count differs from the host
    ///   count
    /// - The time window ends before it starts
    /// - A dedicated profile name is provided but empty after trimming
    pub fn build(self) -> Result<Reservation, ValidationError> {
        if self.id == 0 {
            return Err(ValidationError {
                field: "id".into(),
                message: "identifier 0 is reserved for free grid cells".into(),
            });
        }

        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError {
                field: "name".into(),
                message: "name must be non-empty after trimming whitespace".into(),
            });
        }

        let owner = self.owner.trim().to_string();
        if owner.is_empty() {
            return Err(ValidationError {
                field: "owner".into(),
                message: "owner must be non-empty after trimming whitespace".into(),
            });
        }

        if !self.boot_artifacts.is_empty() && self.boot_artifacts.len() != self.hosts.len() {
            return Err(ValidationError {
                field: "boot_artifacts".into(),
                message: format!(
                    "expected one boot artifact per host ({} hosts, {} artifacts)",
                    self.hosts.len(),
                    self.boot_artifacts.len()
                ),
            });
        }

        let external_profile = match self.external_profile {
            Some(p) => {
                let trimmed = p.trim();
                if trimmed.is_empty() {
                    return Err(ValidationError {
                        field: "external_profile".into(),
                        message: "profile name must be non-empty after trimming whitespace".into(),
                    });
                }
                Some(trimmed.to_string())
            }
            None => None,
        };

        let start_at = self.start_at.unwrap_or_else(SystemTime::now);
        let end_at = self.end_at.unwrap_or(start_at + DEFAULT_WINDOW);
        if end_at < start_at {
            return Err(ValidationError {
                field: "end_at".into(),
                message: "time window ends before it starts".into(),
            });
        }

        Ok(Reservation {
            id: self.id,
            name,
            owner,
            hosts: self.hosts,
            boot_artifacts: self.boot_artifacts,
            external_profile,
            start_at,
            end_at,
        })
    }
}

/// Error type for validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field that failed validation.
    pub field: String,
    /// A description of the validation failure.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "validation error for '{}': {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_basic() {
        let reservation = Reservation::builder(7, "resA", "alice")
            .hosts(vec!["n1".to_string(), "n2".to_string()])
            .build()
            .unwrap();

        assert_eq!(reservation.id(), 7);
        assert_eq!(reservation.name(), "resA");
        assert_eq!(reservation.owner(), "alice");
        assert_eq!(reservation.hosts(), ["n1", "n2"]);
        assert!(reservation.boot_artifacts().is_empty());
        assert_eq!(reservation.external_profile(), None);
    }

    #[test]
    fn test_builder_rejects_zero_id() {
        let result = Reservation::builder(0, "resA", "alice").build();
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().field, "id");
    }

    #[test]
    fn test_builder_rejects_empty_name() {
        let result = Reservation::builder(1, "   ", "alice").build();
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().field, "name");
    }

    #[test]
    fn test_builder_rejects_empty_owner() {
        let result = Reservation::builder(1, "resA", "").build();
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().field, "owner");
    }

    #[test]
    fn test_builder_trims_name_and_owner() {
        let reservation = Reservation::builder(1, "  resA  ", " alice ")
            .build()
            .unwrap();
        assert_eq!(reservation.name(), "resA");
        assert_eq!(reservation.owner(), "alice");
    }

    #[test]
    fn test_builder_artifact_arity() {
        let result = Reservation::builder(1, "resA", "alice")
            .hosts(vec!["n1".to_string(), "n2".to_string()])
            .boot_artifacts(vec!["01-aa-bb".to_string()])
            .build();
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().field, "boot_artifacts");
    }

    #[test]
    fn test_builder_artifacts_optional() {
        // External-Service reservations carry no boot-config files.
        let reservation = Reservation::builder(1, "resA", "alice")
            .hosts(vec!["n1".to_string(), "n2".to_string()])
            .build()
            .unwrap();
        assert!(reservation.boot_artifacts().is_empty());
    }

    #[test]
    fn test_builder_empty_profile_rejected() {
        let result = Reservation::builder(1, "resA", "alice")
            .external_profile(Some("  ".to_string()))
            .build();
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().field, "external_profile");
    }

    #[test]
    fn test_builder_profile_trimmed() {
        let reservation = Reservation::builder(1, "resA", "alice")
            .external_profile(Some(" corral_resA ".to_string()))
            .build()
            .unwrap();
        assert_eq!(reservation.external_profile(), Some("corral_resA"));
    }

    #[test]
    fn test_builder_rejects_inverted_window() {
        let now = SystemTime::now();
        let result = Reservation::builder(1, "resA", "alice")
            .window(now, now - Duration::from_secs(60))
            .build();
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().field, "end_at");
    }

    #[test]
    fn test_is_expired() {
        let now = SystemTime::now();
        let live = Reservation::builder(1, "live", "alice")
            .window(now - Duration::from_secs(60), now + Duration::from_secs(60))
            .build()
            .unwrap();
        assert!(!live.is_expired(now));

        let elapsed = Reservation::builder(2, "elapsed", "alice")
            .window(now - Duration::from_secs(120), now - Duration::from_secs(60))
            .build()
            .unwrap();
        assert!(elapsed.is_expired(now));
    }

    #[test]
    fn test_reservation_serde() {
        let reservation = Reservation::builder(7, "resA", "alice")
            .hosts(vec!["n1".to_string()])
            .boot_artifacts(vec!["01-aa-bb".to_string()])
            .external_profile(Some("corral_resA".to_string()))
            .build()
            .unwrap();

        let json = serde_json::to_string(&reservation).unwrap();
        let deserialized: Reservation = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, reservation);
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError {
            field: "name".to_string(),
            message: "must be non-empty".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("name"));
        assert!(display.contains("must be non-empty"));
    }
}
