//! Common test utilities for integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use corral::backend::{BootProvisioner, NetworkError, NetworkIsolation};
use corral::{Database, DatabaseConfig, Reservation, Result, ScheduleGrid, SchedulerState};

/// Opens a database inside the given temp directory.
#[allow(dead_code)]
pub fn open_database(dir: &tempfile::TempDir) -> Database {
    Database::open(DatabaseConfig::new(dir.path().join("corral.db")))
        .expect("open test database")
}

/// Builder for creating test reservations with sensible defaults.
#[allow(dead_code)]
pub struct ReservationFixture {
    id: u64,
    name: String,
    owner: String,
    hosts: Vec<String>,
    boot_artifacts: Vec<String>,
    external_profile: Option<String>,
    window: Option<(SystemTime, SystemTime)>,
}

#[allow(dead_code)]
impl ReservationFixture {
    /// Creates a fixture builder: id 7, name `resA`, owner `alice`,
    /// hosts `n1`/`n2`, a live one-hour window.
    pub fn new() -> Self {
        Self {
            id: 7,
            name: "resA".to_string(),
            owner: "alice".to_string(),
            hosts: vec!["n1".to_string(), "n2".to_string()],
            boot_artifacts: Vec::new(),
            external_profile: None,
            window: None,
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    pub fn with_hosts(mut self, hosts: &[&str]) -> Self {
        self.hosts = hosts.iter().map(ToString::to_string).collect();
        self
    }

    pub fn with_boot_artifacts(mut self, artifacts: &[&str]) -> Self {
        self.boot_artifacts = artifacts.iter().map(ToString::to_string).collect();
        self
    }

    pub fn with_external_profile(mut self, profile: impl Into<String>) -> Self {
        self.external_profile = Some(profile.into());
        self
    }

    pub fn expired(mut self) -> Self {
        let now = SystemTime::now();
        self.window = Some((now - Duration::from_secs(7200), now - Duration::from_secs(3600)));
        self
    }

    pub fn build(self) -> Reservation {
        let mut builder = Reservation::builder(self.id, self.name, self.owner)
            .hosts(self.hosts)
            .boot_artifacts(self.boot_artifacts)
            .external_profile(self.external_profile);
        if let Some((start, end)) = self.window {
            builder = builder.window(start, end);
        }
        builder.build().expect("fixture should build")
    }
}

#[allow(dead_code)]
impl Default for ReservationFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Seeds the database with one reservation occupying `slices` slices on
/// one slot per host, and returns the saved state.
#[allow(dead_code)]
pub fn seed(db: &mut Database, reservation: &Reservation, slices: usize) -> SchedulerState {
    let mut state = SchedulerState {
        store: corral::ReservationStore::new(),
        grid: ScheduleGrid::new(slices, reservation.hosts().len().max(1)),
    };
    state.store.insert(reservation.clone()).unwrap();
    for slot in 0..reservation.hosts().len() {
        state.grid.assign(0..slices, slot, reservation.id()).unwrap();
    }
    db.save_state(&state).unwrap();
    state
}

/// Network backend counting invocations and recording host lists.
#[derive(Default)]
pub struct CountingNetwork {
    pub clears: AtomicUsize,
    pub host_lists: Mutex<Vec<Vec<String>>>,
}

#[allow(dead_code)]
impl CountingNetwork {
    pub fn count(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

impl NetworkIsolation for CountingNetwork {
    fn clear(&self, hosts: &[String]) -> std::result::Result<(), NetworkError> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.host_lists.lock().unwrap().push(hosts.to_vec());
        Ok(())
    }
}

/// Boot backend recording the reservations it deprovisioned.
#[derive(Default)]
#[allow(dead_code)]
pub struct RecordingBoot {
    pub deprovisioned: Mutex<Vec<String>>,
}

impl BootProvisioner for RecordingBoot {
    fn deprovision(&self, reservation: &Reservation) -> Result<()> {
        self.deprovisioned
            .lock()
            .unwrap()
            .push(reservation.name().to_string());
        Ok(())
    }
}
