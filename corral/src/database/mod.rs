//! Persistence layer for the reservation table and schedule grid.
//!
//! Both records live in a single `SQLite` database and are always written
//! together inside one transaction, so a reader can never observe one
//! updated without the other. The database's WAL journal and busy timeout
//! provide the cross-invocation mutual exclusion that keeps two concurrent
//! deletions from losing updates.
//!
//! # Examples
//!
//! ```no_run
//! use corral::database::{Database, DatabaseConfig};
//!
//! let config = DatabaseConfig::new("/tmp/corral.db");
//! let db = Database::open(config).unwrap();
//!
//! let state = db.load_state().unwrap();
//! println!("{} active reservations", state.store.len());
//! ```

mod config;
mod connection;
pub mod migrations;
mod operations;
mod schema;

#[cfg(test)]
pub(crate) mod test_util;

pub use config::{default_data_dir, resolve_database_path, DatabaseConfig};
pub use connection::Database;
pub use operations::{SchedulerState, StateTransaction};
