//! Database schema definitions and SQL constants.

/// Current schema version for the database.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// SQL statement to create the metadata table.
///
/// Holds key-value pairs: the schema version and the schedule grid
/// dimensions (`grid_slices`, `grid_nodes`).
pub const CREATE_METADATA_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS metadata (
        key TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL
    )";

/// SQL statement to create the reservations table.
///
/// One row per active reservation. Host and boot-artifact lists are JSON
/// arrays; names carry a UNIQUE constraint matching the store invariant.
pub const CREATE_RESERVATIONS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS reservations (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        owner TEXT NOT NULL,
        hosts TEXT NOT NULL,
        boot_artifacts TEXT NOT NULL,
        external_profile TEXT,
        start_at INTEGER NOT NULL,
        end_at INTEGER NOT NULL
    )";

/// SQL statement to create the schedule table.
///
/// One row per occupied grid cell; free cells are represented by absence.
/// Grid dimensions live in the metadata table.
pub const CREATE_SCHEDULE_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS schedule (
        slice INTEGER NOT NULL,
        slot INTEGER NOT NULL,
        reservation_id INTEGER NOT NULL,
        PRIMARY KEY (slice, slot)
    )";

/// SQL statement to create the audit log table.
///
/// Append-only; the reservation column is a full JSON snapshot taken at
/// the time of the transition.
pub const CREATE_AUDIT_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS audit_log (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        kind TEXT NOT NULL,
        reservation TEXT NOT NULL,
        at INTEGER NOT NULL
    )";

/// Index to speed up the reaper's expired-reservation scan.
pub const CREATE_END_AT_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_reservations_end_at ON reservations(end_at)";

/// Index to speed up per-reservation schedule queries.
pub const CREATE_SCHEDULE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_schedule_reservation ON schedule(reservation_id)";

/// SQL statement to select the schema version from the metadata table.
pub const SELECT_SCHEMA_VERSION: &str = "SELECT value FROM metadata WHERE key = 'schema_version'";

/// SQL statement to insert or update the schema version.
pub const INSERT_SCHEMA_VERSION: &str =
    "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?)";

/// SQL statement to insert or replace a reservation row.
pub const INSERT_RESERVATION: &str = r"
    INSERT OR REPLACE INTO reservations
    (id, name, owner, hosts, boot_artifacts, external_profile, start_at, end_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?)
";

/// SQL statement to insert an occupied schedule cell.
pub const INSERT_SCHEDULE_CELL: &str = r"
    INSERT OR REPLACE INTO schedule (slice, slot, reservation_id)
    VALUES (?, ?, ?)
";

/// SQL statement to append an audit entry.
pub const INSERT_AUDIT_EVENT: &str = r"
    INSERT INTO audit_log (kind, reservation, at)
    VALUES (?, ?, ?)
";
