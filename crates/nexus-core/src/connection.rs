//! Connection records and read-time status derivation.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{AuthMethod, CredentialPayload, NetworkId};

/// Age past which a connection is reported stale.
#[must_use]
pub fn stale_after() -> Duration {
    Duration::hours(24)
}

/// Stored or derived status of a connection.
///
/// `Stale` is never written to the store; it only appears as the result of
/// [`derive_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Connected,
    Stale,
    Disconnected,
}

impl ConnectionStatus {
    /// Get the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Stale => "stale",
            Self::Disconnected => "disconnected",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The record of a user's successful authentication against one network.
///
/// At most one active connection exists per (user, network) pair; the store
/// collaborator enforces that by upserting on the pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// The network this connection belongs to.
    pub network_id: NetworkId,

    /// Method the credential was obtained with.
    pub method: AuthMethod,

    /// Credential material produced by the strategy.
    pub payload: CredentialPayload,

    /// When the strategy resolved.
    pub connected_at: DateTime<Utc>,

    /// Stored status.
    pub status: ConnectionStatus,
}

impl Connection {
    /// Whether this connection still counts against the user's network slots.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status != ConnectionStatus::Disconnected
    }
}

/// Derive the read-time status of a connection.
///
/// Returns `Stale` iff the connection is older than 24 hours at `now`;
/// otherwise the stored status, unchanged, whatever it is. Pure; staleness
/// triggers no reconnection or revalidation.
#[must_use]
pub fn derive_status(connection: &Connection, now: DateTime<Utc>) -> ConnectionStatus {
    if now - connection.connected_at > stale_after() {
        ConnectionStatus::Stale
    } else {
        connection.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection_at(connected_at: DateTime<Utc>, status: ConnectionStatus) -> Connection {
        Connection {
            network_id: NetworkId::parse("farcaster").unwrap(),
            method: AuthMethod::Wallet,
            payload: CredentialPayload::Wallet {
                address: "0xabc".into(),
            },
            connected_at,
            status,
        }
    }

    #[test]
    fn fresh_connection_keeps_stored_status() {
        let now = Utc::now();
        let conn = connection_at(now - Duration::hours(2), ConnectionStatus::Connected);
        assert_eq!(derive_status(&conn, now), ConnectionStatus::Connected);
    }

    #[test]
    fn exactly_24h_is_not_stale() {
        let now = Utc::now();
        let conn = connection_at(now - Duration::hours(24), ConnectionStatus::Connected);
        assert_eq!(derive_status(&conn, now), ConnectionStatus::Connected);
    }

    #[test]
    fn over_24h_is_stale() {
        let now = Utc::now();
        let conn = connection_at(
            now - Duration::hours(24) - Duration::seconds(1),
            ConnectionStatus::Connected,
        );
        assert_eq!(derive_status(&conn, now), ConnectionStatus::Stale);
    }

    #[test]
    fn stored_status_passes_through_for_every_value() {
        let now = Utc::now();
        for status in [
            ConnectionStatus::Connected,
            ConnectionStatus::Stale,
            ConnectionStatus::Disconnected,
        ] {
            let fresh = connection_at(now - Duration::hours(1), status);
            assert_eq!(derive_status(&fresh, now), status);

            let old = connection_at(now - Duration::hours(25), status);
            assert_eq!(derive_status(&old, now), ConnectionStatus::Stale);
        }
    }

    #[test]
    fn disconnected_is_not_active() {
        let now = Utc::now();
        assert!(connection_at(now, ConnectionStatus::Connected).is_active());
        assert!(connection_at(now, ConnectionStatus::Stale).is_active());
        assert!(!connection_at(now, ConnectionStatus::Disconnected).is_active());
    }
}
