//! Reservation lifecycle operations.
//!
//! The deletion/expiry workflow lives here: explicit deletion with an
//! ownership check, and the reaper that deletes reservations whose time
//! window has elapsed. Both converge on the same workflow; they differ
//! only in whether caller identity is checked against the recorded owner.

pub mod delete;
pub mod reap;

pub use delete::{DeleteOptions, DeletedReservation, LifecycleEngine};
pub use reap::{ReapOptions, ReapResult};
