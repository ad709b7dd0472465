//! Shared helpers for database unit tests.

use tempfile::TempDir;

use super::config::DatabaseConfig;
use super::connection::Database;

/// Creates a database in a fresh temporary directory.
///
/// The directory handle must be kept alive for the lifetime of the
/// database, so it is returned alongside it.
pub(crate) fn create_test_database() -> (Database, TempDir) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("test.db");
    let db = Database::open(DatabaseConfig::new(path)).expect("open test database");
    (db, dir)
}
