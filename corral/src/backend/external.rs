//! The External-Service provisioning variant.
//!
//! Per-host boot profiles are owned by a separate provisioning service
//! whose calls are slow, so per-host resets fan out across a bounded
//! worker pool and join before anything dependent runs. Only after every
//! host is confirmed back on the cluster's default profile may the
//! reservation-specific profile and image be deleted: a host mid-reset
//! must never reference a profile that is being destroyed.

use std::collections::VecDeque;
use std::fmt;
use std::process::Command;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::reservation::Reservation;

use super::BootProvisioner;

/// Failure reported by a provisioning-service call.
#[derive(Debug, Clone)]
pub struct ServiceError(
    /// Human-readable description of the failed call.
    pub String,
);

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ServiceError {}

/// The provisioning service boundary.
///
/// Three operations, all addressed by names in the scheduler's own
/// namespace: assign a profile to a host, delete a profile, delete an
/// image/distro definition.
pub trait ProvisioningService: Send + Sync {
    /// Assigns `profile` to `host`.
    ///
    /// # Errors
    ///
    /// Returns a [`ServiceError`] describing the failed call.
    fn assign_profile(&self, host: &str, profile: &str) -> std::result::Result<(), ServiceError>;

    /// Deletes the named profile.
    ///
    /// # Errors
    ///
    /// Returns a [`ServiceError`] describing the failed call.
    fn delete_profile(&self, profile: &str) -> std::result::Result<(), ServiceError>;

    /// Deletes the named image definition.
    ///
    /// # Errors
    ///
    /// Returns a [`ServiceError`] describing the failed call.
    fn delete_image(&self, image: &str) -> std::result::Result<(), ServiceError>;
}

/// A provisioning service driven through its command-line tool.
pub struct CommandService {
    program: String,
}

impl CommandService {
    /// Creates a service wrapper invoking `program`.
    #[must_use]
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }

    fn run(&self, args: &[&str]) -> std::result::Result<(), ServiceError> {
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|e| ServiceError(format!("{} failed to start: {e}", self.program)))?;
        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            Err(ServiceError(format!(
                "{} {} exited with {}: {stderr}",
                self.program,
                args.join(" "),
                output.status
            )))
        }
    }
}

impl ProvisioningService for CommandService {
    fn assign_profile(&self, host: &str, profile: &str) -> std::result::Result<(), ServiceError> {
        self.run(&[
            "system",
            "edit",
            &format!("--name={host}"),
            &format!("--profile={profile}"),
        ])
    }

    fn delete_profile(&self, profile: &str) -> std::result::Result<(), ServiceError> {
        self.run(&["profile", "remove", &format!("--name={profile}")])
    }

    fn delete_image(&self, image: &str) -> std::result::Result<(), ServiceError> {
        self.run(&["distro", "remove", &format!("--name={image}")])
    }
}

/// Boot provisioner delegating per-host profiles to an external service.
pub struct ExternalServiceProvisioner {
    service: Arc<dyn ProvisioningService>,
    default_profile: String,
    reset_workers: usize,
    reset_timeout: Duration,
}

impl ExternalServiceProvisioner {
    /// Creates a provisioner over the given service.
    ///
    /// `reset_workers` bounds the fan-out; `reset_timeout` bounds the wait
    /// between per-host completions during the join.
    #[must_use]
    pub fn new(
        service: Arc<dyn ProvisioningService>,
        default_profile: String,
        reset_workers: usize,
        reset_timeout: Duration,
    ) -> Self {
        Self {
            service,
            default_profile,
            reset_workers,
            reset_timeout,
        }
    }

    /// Resets every host to the default profile and waits for all of them.
    ///
    /// This is the barrier the ordering invariant depends on: the caller
    /// may not touch the reservation-specific profile until this returns
    /// `Ok`.
    fn reset_hosts(&self, reservation: &Reservation) -> Result<()> {
        let hosts = reservation.hosts();
        if hosts.is_empty() {
            return Ok(());
        }

        let queue: Arc<Mutex<VecDeque<String>>> =
            Arc::new(Mutex::new(hosts.iter().cloned().collect()));
        let (sender, receiver) = mpsc::channel::<(String, std::result::Result<(), ServiceError>)>();

        let workers = self.reset_workers.clamp(1, hosts.len());
        for _ in 0..workers {
            let queue = Arc::clone(&queue);
            let service = Arc::clone(&self.service);
            let profile = self.default_profile.clone();
            let sender = sender.clone();
            thread::spawn(move || loop {
                let host = queue.lock().map(|mut q| q.pop_front());
                match host {
                    Ok(Some(host)) => {
                        let result = service.assign_profile(&host, &profile);
                        // The join may have given up; stop quietly then.
                        if sender.send((host, result)).is_err() {
                            break;
                        }
                    }
                    _ => break,
                }
            });
        }
        drop(sender);

        let mut failures = Vec::new();
        for _ in 0..hosts.len() {
            match receiver.recv_timeout(self.reset_timeout) {
                Ok((host, Ok(()))) => log::debug!("reset {host} to {}", self.default_profile),
                Ok((host, Err(e))) => failures.push(format!("{host}: {e}")),
                Err(_) => {
                    return Err(Error::Provisioning {
                        name: reservation.name().to_string(),
                        details: format!(
                            "timed out after {:?} waiting for host resets; profile cleanup skipped",
                            self.reset_timeout
                        ),
                    });
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::Provisioning {
                name: reservation.name().to_string(),
                details: failures.join("; "),
            })
        }
    }
}

impl BootProvisioner for ExternalServiceProvisioner {
    fn deprovision(&self, reservation: &Reservation) -> Result<()> {
        self.reset_hosts(reservation)?;

        // All hosts confirmed on the default profile; the dedicated
        // profile (if any) is now unreferenced and safe to delete.
        if let Some(profile) = reservation.external_profile() {
            self.service
                .delete_profile(profile)
                .map_err(|e| Error::Provisioning {
                    name: reservation.name().to_string(),
                    details: format!("deleting profile {profile}: {e}"),
                })?;
            self.service
                .delete_image(profile)
                .map_err(|e| Error::Provisioning {
                    name: reservation.name().to_string(),
                    details: format!("deleting image {profile}: {e}"),
                })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Records every call with a monotonic sequence number.
    #[derive(Default)]
    struct RecordingService {
        sequence: AtomicU64,
        calls: Mutex<Vec<(String, u64)>>,
        delay: Option<Duration>,
        fail_hosts: Vec<String>,
    }

    impl RecordingService {
        fn record(&self, call: String) -> u64 {
            let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
            self.calls.lock().unwrap().push((call, seq));
            seq
        }

        fn calls(&self) -> Vec<(String, u64)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ProvisioningService for RecordingService {
        fn assign_profile(
            &self,
            host: &str,
            profile: &str,
        ) -> std::result::Result<(), ServiceError> {
            if let Some(delay) = self.delay {
                thread::sleep(delay);
            }
            self.record(format!("assign {host} {profile}"));
            if self.fail_hosts.iter().any(|h| h == host) {
                Err(ServiceError(format!("injected failure for {host}")))
            } else {
                Ok(())
            }
        }

        fn delete_profile(&self, profile: &str) -> std::result::Result<(), ServiceError> {
            self.record(format!("delete-profile {profile}"));
            Ok(())
        }

        fn delete_image(&self, image: &str) -> std::result::Result<(), ServiceError> {
            self.record(format!("delete-image {image}"));
            Ok(())
        }
    }

    fn provisioner(service: Arc<RecordingService>) -> ExternalServiceProvisioner {
        ExternalServiceProvisioner::new(service, "default".to_string(), 4, Duration::from_secs(5))
    }

    fn reservation(hosts: &[&str], profile: Option<&str>) -> Reservation {
        Reservation::builder(7, "resC", "alice")
            .hosts(hosts.iter().map(ToString::to_string).collect())
            .external_profile(profile.map(ToString::to_string))
            .build()
            .unwrap()
    }

    #[test]
    fn test_shared_profile_skips_deletion() {
        let service = Arc::new(RecordingService::default());
        let provisioner = provisioner(Arc::clone(&service));
        let reservation = reservation(&["n3", "n4", "n5"], None);

        provisioner.deprovision(&reservation).unwrap();

        let calls = service.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls.iter().all(|(call, _)| call.starts_with("assign")));
    }

    #[test]
    fn test_profile_deleted_after_every_reset() {
        let service = Arc::new(RecordingService {
            delay: Some(Duration::from_millis(10)),
            ..RecordingService::default()
        });
        let provisioner = provisioner(Arc::clone(&service));
        let reservation = reservation(&["n6", "n7", "n8"], Some("corral_resC"));

        provisioner.deprovision(&reservation).unwrap();

        let calls = service.calls();
        let max_reset = calls
            .iter()
            .filter(|(call, _)| call.starts_with("assign"))
            .map(|&(_, seq)| seq)
            .max()
            .unwrap();
        let profile_delete = calls
            .iter()
            .find(|(call, _)| call == "delete-profile corral_resC")
            .map(|&(_, seq)| seq)
            .unwrap();
        let image_delete = calls
            .iter()
            .find(|(call, _)| call == "delete-image corral_resC")
            .map(|&(_, seq)| seq)
            .unwrap();

        // Every reset strictly precedes the profile deletion, and the
        // profile deletion precedes the image deletion.
        assert!(max_reset < profile_delete);
        assert!(profile_delete < image_delete);
    }

    #[test]
    fn test_single_host_dedicated_profile() {
        let service = Arc::new(RecordingService::default());
        let provisioner = provisioner(Arc::clone(&service));
        let reservation = reservation(&["n6"], Some("corral_resD"));

        provisioner.deprovision(&reservation).unwrap();

        let calls: Vec<String> = service.calls().into_iter().map(|(call, _)| call).collect();
        assert_eq!(
            calls,
            vec![
                "assign n6 default".to_string(),
                "delete-profile corral_resD".to_string(),
                "delete-image corral_resD".to_string(),
            ]
        );
    }

    #[test]
    fn test_failed_reset_skips_profile_deletion() {
        let service = Arc::new(RecordingService {
            fail_hosts: vec!["n7".to_string()],
            ..RecordingService::default()
        });
        let provisioner = provisioner(Arc::clone(&service));
        let reservation = reservation(&["n6", "n7"], Some("corral_resC"));

        let err = provisioner.deprovision(&reservation).unwrap_err();
        assert!(matches!(err, Error::Provisioning { .. }));
        assert!(format!("{err}").contains("n7"));

        // The dedicated profile must survive a partial reset.
        let calls = service.calls();
        assert!(calls
            .iter()
            .all(|(call, _)| !call.starts_with("delete-profile")));
    }

    #[test]
    fn test_empty_host_list() {
        let service = Arc::new(RecordingService::default());
        let provisioner = provisioner(Arc::clone(&service));
        let reservation = reservation(&[], Some("corral_resE"));

        provisioner.deprovision(&reservation).unwrap();

        // No resets needed; the dedicated profile is still cleaned up.
        let calls: Vec<String> = service.calls().into_iter().map(|(call, _)| call).collect();
        assert_eq!(
            calls,
            vec![
                "delete-profile corral_resE".to_string(),
                "delete-image corral_resE".to_string(),
            ]
        );
    }

    /// A service whose resets never finish in time.
    struct StallingService;

    impl ProvisioningService for StallingService {
        fn assign_profile(&self, _: &str, _: &str) -> std::result::Result<(), ServiceError> {
            thread::sleep(Duration::from_secs(2));
            Ok(())
        }

        fn delete_profile(&self, _: &str) -> std::result::Result<(), ServiceError> {
            panic!("profile deletion must not run after a timed-out join");
        }

        fn delete_image(&self, _: &str) -> std::result::Result<(), ServiceError> {
            panic!("image deletion must not run after a timed-out join");
        }
    }

    #[test]
    fn test_stalled_reset_times_out() {
        let provisioner = ExternalServiceProvisioner::new(
            Arc::new(StallingService),
            "default".to_string(),
            2,
            Duration::from_millis(50),
        );
        let reservation = reservation(&["n6"], Some("corral_resF"));

        let err = provisioner.deprovision(&reservation).unwrap_err();
        assert!(format!("{err}").contains("timed out"));
    }
}
