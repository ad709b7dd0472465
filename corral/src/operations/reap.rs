//! The expiry reaper.
//!
//! Finds reservations whose time window has elapsed and deletes each one
//! through the regular deletion workflow with the ownership check off.
//! Per-reservation cleanup failures are collected rather than aborting the
//! sweep; both backends are idempotent, so the next sweep retries them
//! cleanly. A persistence failure aborts, since nothing later can commit.

use std::time::SystemTime;

use crate::error::{Error, Result};
use crate::reservation::Reservation;

use super::delete::{DeleteOptions, LifecycleEngine};

/// Options for a reaper sweep.
#[derive(Debug, Clone, Default)]
pub struct ReapOptions {
    /// Report what would be removed without removing anything.
    pub dry_run: bool,

    /// The sweep's notion of "now"; `None` uses the current time.
    pub now: Option<SystemTime>,

    /// Caller identity override; `None` resolves from the environment.
    pub caller: Option<String>,
}

impl ReapOptions {
    /// Creates default options: a live sweep at the current time.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets dry-run mode.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Pins the sweep's notion of "now".
    #[must_use]
    pub const fn with_now(mut self, now: SystemTime) -> Self {
        self.now = Some(now);
        self
    }

    /// Overrides caller identity instead of resolving it from the
    /// environment.
    #[must_use]
    pub fn with_caller(mut self, caller: impl Into<String>) -> Self {
        self.caller = Some(caller.into());
        self
    }
}

/// Result of a reaper sweep.
#[derive(Debug)]
pub struct ReapResult {
    /// Reservations removed (or that would be removed, in dry-run mode).
    pub removed: Vec<Reservation>,

    /// Per-reservation failures as `(name, error)` pairs. The named
    /// reservations stay expired and are retried on the next sweep.
    pub failures: Vec<(String, Error)>,
}

impl ReapResult {
    /// Checks whether the sweep completed without per-reservation
    /// failures.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl LifecycleEngine<'_> {
    /// Deletes every reservation whose time window has elapsed.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted state cannot be read, or if a
    /// deletion fails at the persistence step (later deletions could not
    /// commit either). Backend cleanup failures do not abort the sweep;
    /// they are collected in the result.
    pub fn reap(&mut self, options: &ReapOptions) -> Result<ReapResult> {
        let now = options.now.unwrap_or_else(SystemTime::now);

        let state = self.database().load_state()?;
        let mut expired: Vec<Reservation> = state
            .store
            .iter()
            .filter(|r| r.is_expired(now))
            .cloned()
            .collect();
        // Deterministic sweep order for logs and tests.
        expired.sort_by_key(Reservation::id);

        if options.dry_run {
            return Ok(ReapResult {
                removed: expired,
                failures: Vec::new(),
            });
        }

        let mut removed = Vec::new();
        let mut failures = Vec::new();

        for reservation in expired {
            let mut delete = DeleteOptions::new(reservation.name()).with_check_user(false);
            if let Some(caller) = &options.caller {
                delete = delete.with_caller(caller.clone());
            }

            match self.delete_reservation(&delete) {
                Ok(deleted) => removed.push(deleted.reservation),
                Err(e @ Error::Persistence(_)) => return Err(e),
                Err(e) => {
                    log::warn!("reaping '{}' failed: {e}", reservation.name());
                    failures.push((reservation.name().to_string(), e));
                }
            }
        }

        Ok(ReapResult { removed, failures })
    }
}
