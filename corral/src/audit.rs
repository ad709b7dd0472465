//! The append-only audit log.
//!
//! One entry is recorded per successful lifecycle transition, carrying the
//! event kind and the full reservation snapshot at the time of the
//! transition. Failed attempts are never recorded.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::reservation::Reservation;

/// The kind of lifecycle transition an audit entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditKind {
    /// A reservation was created.
    Created,
    /// A reservation was deleted, explicitly or by expiry.
    Deleted,
}

impl AuditKind {
    /// Returns the canonical storage token for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Deleted => "DELETED",
        }
    }

    /// Parses a storage token back into a kind.
    ///
    /// # Errors
    ///
    /// Returns the unrecognized token.
    pub fn parse(token: &str) -> Result<Self, String> {
        match token {
            "CREATED" => Ok(Self::Created),
            "DELETED" => Ok(Self::Deleted),
            other => Err(other.to_string()),
        }
    }
}

impl std::fmt::Display for AuditKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// The lifecycle transition recorded.
    pub kind: AuditKind,
    /// Snapshot of the reservation at the time of the transition.
    pub reservation: Reservation,
    /// When the entry was appended.
    pub at: SystemTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        for kind in [AuditKind::Created, AuditKind::Deleted] {
            assert_eq!(AuditKind::parse(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    fn test_kind_parse_rejects_unknown() {
        assert!(AuditKind::parse("EXTENDED").is_err());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(format!("{}", AuditKind::Deleted), "DELETED");
    }
}
