#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # corral
//!
//! A library for scheduling testbed node reservations.
//!
//! corral allocates physical cluster nodes to users for bounded time
//! windows, tracks which node belongs to which reservation in a
//! time-indexed schedule grid, and drives the side effects of
//! deallocation: network isolation cleanup, boot-image deprovisioning,
//! and audit logging.
//!
//! ## Core Types
//!
//! - [`Reservation`]: a named, owned, time-bounded grant of nodes
//! - [`ReservationStore`] and [`ScheduleGrid`]: the persisted state
//! - [`LifecycleEngine`] and [`DeleteOptions`]: the deletion/expiry workflow
//! - [`Error`] and [`Result`]: error handling types
//!
//! ## Examples
//!
//! ```
//! use corral::{Reservation, ReservationStore, ScheduleGrid};
//!
//! let mut store = ReservationStore::new();
//! let reservation = Reservation::builder(7, "resA", "alice")
//!     .hosts(vec!["n1".to_string()])
//!     .build()
//!     .unwrap();
//! store.insert(reservation).unwrap();
//!
//! let mut grid = ScheduleGrid::new(4, 8);
//! grid.assign(0..4, 0, 7).unwrap();
//! assert_eq!(grid.occupancy(7).len(), 4);
//! ```

pub mod audit;
pub mod backend;
pub mod config;
pub mod database;
pub mod error;
pub mod grid;
mod identity;
pub mod logging;
pub mod operations;
pub mod reservation;
pub mod store;

// Re-export key types at crate root for convenience
pub use audit::{AuditEvent, AuditKind};
pub use backend::{
    boot_provisioner_from_config, network_from_config, BootProvisioner, NetworkIsolation,
};
pub use config::{load_config, BootMode, Config};
pub use database::{Database, DatabaseConfig, SchedulerState};
pub use error::{Error, Result};
pub use grid::{ScheduleGrid, TimeSlice};
pub use identity::current_user;
pub use logging::{init_logger, LogLevel, Logger};
pub use operations::{DeleteOptions, DeletedReservation, LifecycleEngine, ReapOptions, ReapResult};
pub use reservation::{Reservation, ReservationBuilder};
pub use store::ReservationStore;
