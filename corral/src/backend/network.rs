//! The network isolation boundary.
//!
//! While a reservation is active its hosts are network-isolated (VLAN
//! membership or similar); deletion clears that isolation. The backend is
//! an external collaborator specified only by its contract: `clear` must
//! be idempotent, and it must attempt the full host list rather than
//! stopping at the first failing host.

use std::fmt;
use std::process::Command;

/// Aggregate failure from a network clear operation.
///
/// Carries one entry per host that could not be cleared; hosts not listed
/// were cleared successfully.
#[derive(Debug)]
pub struct NetworkError {
    /// Per-host failures as `(host, detail)` pairs.
    pub failures: Vec<(String, String)>,
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary: Vec<String> = self
            .failures
            .iter()
            .map(|(host, detail)| format!("{host}: {detail}"))
            .collect();
        write!(f, "{}", summary.join("; "))
    }
}

impl std::error::Error for NetworkError {}

/// Clears per-host network isolation.
///
/// Implementations must be idempotent (clearing a host that is already
/// unisolated succeeds) and must attempt every host in the list even
/// when earlier hosts fail, reporting one aggregate error.
pub trait NetworkIsolation {
    /// Clears isolation for every host in `hosts`.
    ///
    /// # Errors
    ///
    /// Returns a [`NetworkError`] listing each host that failed.
    fn clear(&self, hosts: &[String]) -> Result<(), NetworkError>;
}

/// A network backend that runs a configured command once per host.
///
/// The command is the configured program plus leading arguments, with the
/// hostname appended, e.g. `["vlanctl", "clear"]` runs
/// `vlanctl clear n1`, `vlanctl clear n2`, …
pub struct CommandNetwork {
    command: Vec<String>,
}

impl CommandNetwork {
    /// Creates a backend running `command` (program plus leading args).
    #[must_use]
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

impl NetworkIsolation for CommandNetwork {
    fn clear(&self, hosts: &[String]) -> Result<(), NetworkError> {
        let mut failures = Vec::new();

        for host in hosts {
            let output = Command::new(&self.command[0])
                .args(&self.command[1..])
                .arg(host)
                .output();

            match output {
                Ok(output) if output.status.success() => {
                    log::debug!("cleared network isolation for {host}");
                }
                Ok(output) => {
                    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                    log::warn!("network clear failed for {host}: {stderr}");
                    failures.push((host.clone(), format!("exit {}: {stderr}", output.status)));
                }
                Err(e) => {
                    log::warn!("network clear command failed to start for {host}: {e}");
                    failures.push((host.clone(), e.to_string()));
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(NetworkError { failures })
        }
    }
}

/// A network backend for deployments where isolation is not managed here.
///
/// Always succeeds; trivially idempotent.
pub struct NoopNetwork;

impl NetworkIsolation for NoopNetwork {
    fn clear(&self, _hosts: &[String]) -> Result<(), NetworkError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_is_idempotent() {
        let backend = NoopNetwork;
        let hosts = vec!["n1".to_string(), "n2".to_string()];
        // Clearing the same set twice succeeds both times.
        assert!(backend.clear(&hosts).is_ok());
        assert!(backend.clear(&hosts).is_ok());
    }

    #[test]
    fn test_command_network_success() {
        let backend = CommandNetwork::new(vec!["true".to_string()]);
        let hosts = vec!["n1".to_string(), "n2".to_string()];
        assert!(backend.clear(&hosts).is_ok());
    }

    #[test]
    fn test_command_network_processes_full_list() {
        // `false` fails for every host; the error must list them all
        // rather than stopping at the first.
        let backend = CommandNetwork::new(vec!["false".to_string()]);
        let hosts = vec!["n1".to_string(), "n2".to_string(), "n3".to_string()];

        let err = backend.clear(&hosts).unwrap_err();
        assert_eq!(err.failures.len(), 3);
        let display = format!("{err}");
        assert!(display.contains("n1"));
        assert!(display.contains("n3"));
    }

    #[test]
    fn test_command_network_missing_program() {
        let backend = CommandNetwork::new(vec!["corral-no-such-program".to_string()]);
        let hosts = vec!["n1".to_string()];
        let err = backend.clear(&hosts).unwrap_err();
        assert_eq!(err.failures.len(), 1);
        assert_eq!(err.failures[0].0, "n1");
    }
}
