//! The in-memory reservation table.
//!
//! The store owns reservation values; the schedule grid holds only their
//! identifiers. It is an explicit value loaded by the persistence layer
//! and passed to the lifecycle engine; there is no ambient global table.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::reservation::Reservation;

/// Mapping from identifier to active reservation.
///
/// Keys are unique non-zero identifiers; names are unique across the
/// table. Insertion order is irrelevant.
///
/// # Examples
///
/// ```
/// use corral::{Reservation, ReservationStore};
///
/// let mut store = ReservationStore::new();
/// let reservation = Reservation::builder(7, "resA", "alice").build().unwrap();
/// store.insert(reservation).unwrap();
///
/// assert!(store.lookup_by_name("resA").is_some());
/// assert!(store.remove(7).is_some());
/// assert!(store.lookup_by_name("resA").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReservationStore {
    by_id: HashMap<u64, Reservation>,
}

impl ReservationStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a reservation.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the identifier or the name is already
    /// taken by another active reservation.
    pub fn insert(&mut self, reservation: Reservation) -> Result<()> {
        if self.by_id.contains_key(&reservation.id()) {
            return Err(Error::Validation {
                field: "id".into(),
                message: format!("reservation id {} is already active", reservation.id()),
            });
        }
        if self.lookup_by_name(reservation.name()).is_some() {
            return Err(Error::Validation {
                field: "name".into(),
                message: format!(
                    "reservation name '{}' is already active",
                    reservation.name()
                ),
            });
        }
        self.by_id.insert(reservation.id(), reservation);
        Ok(())
    }

    /// Looks up a reservation by identifier.
    #[must_use]
    pub fn get(&self, id: u64) -> Option<&Reservation> {
        self.by_id.get(&id)
    }

    /// Looks up a reservation by its user-facing name.
    #[must_use]
    pub fn lookup_by_name(&self, name: &str) -> Option<&Reservation> {
        self.by_id.values().find(|r| r.name() == name)
    }

    /// Removes a reservation by identifier, returning it if present.
    ///
    /// Removing an absent identifier is a silent no-op; callers that need
    /// a not-found error check existence first via lookup.
    pub fn remove(&mut self, id: u64) -> Option<Reservation> {
        self.by_id.remove(&id)
    }

    /// Returns the number of active reservations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Checks whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Iterates over active reservations in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &Reservation> {
        self.by_id.values()
    }
}
