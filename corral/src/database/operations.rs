//! Load/save operations for the reservation table and schedule grid.
//!
//! The two records are loaded together into a [`SchedulerState`] and saved
//! back wholesale. Mutating callers wrap the whole read-mutate-persist
//! sequence in a [`StateTransaction`] (BEGIN IMMEDIATE), which takes the
//! database's write lock up front: a concurrent invocation blocks at its
//! own `begin_update` until the first commits, so nobody ever mutates a
//! stale snapshot. The commit is the deletion workflow's commit point:
//! either both records reflect the mutation or neither does.

// Timestamp and grid-coordinate columns are i64 in SQLite.
#![allow(clippy::cast_sign_loss, clippy::cast_possible_wrap, clippy::cast_possible_truncation)]

use std::time::{Duration, SystemTime};

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use crate::audit::{AuditEvent, AuditKind};
use crate::error::{Error, Result};
use crate::grid::{ScheduleGrid, FREE};
use crate::reservation::Reservation;
use crate::store::ReservationStore;

use super::connection::Database;
use super::schema::{INSERT_AUDIT_EVENT, INSERT_RESERVATION, INSERT_SCHEDULE_CELL};

/// The two persisted records, loaded as one unit.
#[derive(Debug, Clone)]
pub struct SchedulerState {
    /// The active reservation table.
    pub store: ReservationStore,
    /// The time/node allocation grid.
    pub grid: ScheduleGrid,
}

/// An exclusive read-mutate-persist critical section.
///
/// Holds the database write lock from creation until [`commit`] or drop
/// (drop rolls back). Created via [`Database::begin_update`].
///
/// [`commit`]: StateTransaction::commit
pub struct StateTransaction<'a> {
    tx: rusqlite::Transaction<'a>,
}

impl StateTransaction<'_> {
    /// Loads the reservation table and schedule grid inside the critical
    /// section.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or stored rows violate store/grid
    /// invariants.
    pub fn load_state(&self) -> Result<SchedulerState> {
        load_state_from(&self.tx)
    }

    /// Saves the reservation table and schedule grid as one unit.
    ///
    /// Nothing becomes durable until [`commit`](Self::commit).
    ///
    /// # Errors
    ///
    /// Returns an error if any write fails.
    pub fn save_state(&self, state: &SchedulerState) -> Result<()> {
        save_state_to(&self.tx, state)
    }

    /// Commits the critical section.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails; durable state is then
    /// unchanged.
    pub fn commit(self) -> Result<()> {
        self.tx.commit()?;
        Ok(())
    }
}

fn to_epoch(time: SystemTime) -> Result<i64> {
    let secs = time
        .duration_since(SystemTime::UNIX_EPOCH)
        .map_err(|e| Error::Validation {
            field: "timestamp".into(),
            message: format!("invalid timestamp: {e}"),
        })?
        .as_secs();
    Ok(secs as i64)
}

fn from_epoch(secs: i64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(secs as u64)
}

fn load_state_from(conn: &Connection) -> Result<SchedulerState> {
    let mut store = ReservationStore::new();

    let mut stmt = conn.prepare(
        "SELECT id, name, owner, hosts, boot_artifacts, external_profile, start_at, end_at
         FROM reservations",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, Option<String>>(5)?,
            row.get::<_, i64>(6)?,
            row.get::<_, i64>(7)?,
        ))
    })?;

    for row in rows {
        let (id, name, owner, hosts, artifacts, profile, start_at, end_at) = row?;
        let hosts: Vec<String> = serde_json::from_str(&hosts)?;
        let artifacts: Vec<String> = serde_json::from_str(&artifacts)?;
        let reservation = Reservation::builder(id as u64, name, owner)
            .hosts(hosts)
            .boot_artifacts(artifacts)
            .external_profile(profile)
            .window(from_epoch(start_at), from_epoch(end_at))
            .build()?;
        store.insert(reservation)?;
    }

    let grid = load_grid_from(conn)?;
    Ok(SchedulerState { store, grid })
}

fn load_grid_from(conn: &Connection) -> Result<ScheduleGrid> {
    let num_slices = metadata_usize(conn, "grid_slices")?.unwrap_or(0);
    let num_nodes = metadata_usize(conn, "grid_nodes")?.unwrap_or(0);

    let mut stmt = conn.prepare("SELECT slice, slot, reservation_id FROM schedule")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, i64>(2)?,
        ))
    })?;

    let mut cells = Vec::new();
    for row in rows {
        let (slice, slot, id) = row?;
        cells.push((slice as usize, slot as usize, id as u64));
    }

    ScheduleGrid::from_cells(num_slices, num_nodes, &cells)
}

fn metadata_usize(conn: &Connection, key: &str) -> Result<Option<usize>> {
    let value: Option<String> = conn
        .query_row("SELECT value FROM metadata WHERE key = ?", [key], |row| {
            row.get(0)
        })
        .optional()?;
    match value {
        Some(v) => v.parse::<usize>().map(Some).map_err(|e| Error::Validation {
            field: key.to_string(),
            message: format!("corrupt metadata value '{v}': {e}"),
        }),
        None => Ok(None),
    }
}

fn save_state_to(conn: &Connection, state: &SchedulerState) -> Result<()> {
    conn.execute("DELETE FROM reservations", [])?;
    conn.execute("DELETE FROM schedule", [])?;

    let mut insert_reservation = conn.prepare(INSERT_RESERVATION)?;
    for reservation in state.store.iter() {
        insert_reservation.execute(params![
            reservation.id() as i64,
            reservation.name(),
            reservation.owner(),
            serde_json::to_string(reservation.hosts())?,
            serde_json::to_string(reservation.boot_artifacts())?,
            reservation.external_profile(),
            to_epoch(reservation.start_at())?,
            to_epoch(reservation.end_at())?,
        ])?;
    }

    let mut insert_cell = conn.prepare(INSERT_SCHEDULE_CELL)?;
    for (slice_index, slice) in state.grid.slices().iter().enumerate() {
        for (slot_index, &slot) in slice.nodes().iter().enumerate() {
            if slot != FREE {
                insert_cell.execute(params![slice_index as i64, slot_index as i64, slot as i64])?;
            }
        }
    }

    let mut set_meta = conn.prepare("INSERT OR REPLACE INTO metadata (key, value) VALUES (?, ?)")?;
    set_meta.execute(params!["grid_slices", state.grid.num_slices().to_string()])?;
    set_meta.execute(params!["grid_nodes", state.grid.num_nodes().to_string()])?;

    Ok(())
}

impl Database {
    /// Begins an exclusive read-mutate-persist critical section.
    ///
    /// Takes the database write lock immediately (BEGIN IMMEDIATE); a
    /// concurrent invocation's `begin_update` blocks until this one
    /// commits or rolls back, bounded by the configured busy timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock cannot be acquired within the busy
    /// timeout.
    pub fn begin_update(&mut self) -> Result<StateTransaction<'_>> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        Ok(StateTransaction { tx })
    }

    /// Loads the reservation table and schedule grid.
    ///
    /// A fresh database yields an empty store and a zero-dimension grid.
    /// Read-only callers may use this directly; mutating callers go
    /// through [`begin_update`](Self::begin_update) instead so the read
    /// and the write sit in one critical section.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or stored rows violate store/grid
    /// invariants (duplicate names, out-of-bounds cells).
    pub fn load_state(&self) -> Result<SchedulerState> {
        load_state_from(&self.conn)
    }

    /// Saves the reservation table and schedule grid as one unit, in its
    /// own transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started, any write
    /// fails, or the commit fails.
    pub fn save_state(&mut self, state: &SchedulerState) -> Result<()> {
        let tx = self.begin_update()?;
        tx.save_state(state)?;
        tx.commit()
    }

    /// Appends an entry to the audit log.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be serialized or the insert
    /// fails.
    pub fn append_audit(&self, kind: AuditKind, reservation: &Reservation) -> Result<()> {
        let snapshot = serde_json::to_string(reservation)?;
        self.conn.execute(
            INSERT_AUDIT_EVENT,
            params![kind.as_str(), snapshot, to_epoch(SystemTime::now())?],
        )?;
        Ok(())
    }

    /// Lists audit entries in append order.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or decoding fails.
    pub fn list_audit(&self) -> Result<Vec<AuditEvent>> {
        let mut stmt = self
            .conn
            .prepare("SELECT kind, reservation, at FROM audit_log ORDER BY seq")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (kind, snapshot, at) = row?;
            let kind = AuditKind::parse(&kind).map_err(|token| Error::Validation {
                field: "kind".into(),
                message: format!("unknown audit kind '{token}'"),
            })?;
            events.push(AuditEvent {
                kind,
                reservation: serde_json::from_str(&snapshot)?,
                at: from_epoch(at),
            });
        }
        Ok(events)
    }
}
