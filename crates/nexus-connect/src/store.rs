//! Connection persistence trait and in-memory implementation.

use async_trait::async_trait;
use parking_lot::RwLock;

use nexus_core::{Connection, ConnectionStatus, NetworkId, UserId};

/// Persistence failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached or refused the write.
    #[error("connection store unavailable: {message}")]
    Unavailable { message: String },

    /// No connection exists for the (user, network) pair.
    #[error("no connection for network {network}")]
    NotFound { network: NetworkId },
}

/// The user/profile persistence collaborator.
///
/// Treated as authoritative: the orchestrator does not retry failed calls; a
/// failed persist surfaces as an error state transition.
#[async_trait]
pub trait ConnectionStore: Send + Sync {
    /// Insert or replace the connection for (user, network).
    ///
    /// Keying on the pair keeps at most one active connection per pair.
    ///
    /// # Errors
    /// Returns `Unavailable` when the write fails.
    async fn upsert_connection(
        &self,
        user: &UserId,
        connection: Connection,
    ) -> Result<Connection, StoreError>;

    /// All connections for the user, in insertion order.
    ///
    /// # Errors
    /// Returns `Unavailable` when the read fails.
    async fn list_connections(&self, user: &UserId) -> Result<Vec<Connection>, StoreError>;

    /// Mark the connection for (user, network) disconnected.
    ///
    /// # Errors
    /// Returns `NotFound` when no connection exists for the pair.
    async fn deactivate_connection(
        &self,
        user: &UserId,
        network: &NetworkId,
    ) -> Result<(), StoreError>;
}

/// In-memory connection store.
///
/// Suitable for testing and single-session embedding. Rows keep insertion
/// order so downstream consumers see connections in connect order.
#[derive(Debug, Default)]
pub struct MemoryConnectionStore {
    rows: RwLock<Vec<(UserId, Connection)>>,
}

impl MemoryConnectionStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionStore for MemoryConnectionStore {
    async fn upsert_connection(
        &self,
        user: &UserId,
        connection: Connection,
    ) -> Result<Connection, StoreError> {
        let mut rows = self.rows.write();
        let existing = rows
            .iter_mut()
            .find(|(owner, row)| owner == user && row.network_id == connection.network_id);
        match existing {
            Some((_, row)) => *row = connection.clone(),
            None => rows.push((*user, connection.clone())),
        }
        Ok(connection)
    }

    async fn list_connections(&self, user: &UserId) -> Result<Vec<Connection>, StoreError> {
        Ok(self
            .rows
            .read()
            .iter()
            .filter(|(owner, _)| owner == user)
            .map(|(_, row)| row.clone())
            .collect())
    }

    async fn deactivate_connection(
        &self,
        user: &UserId,
        network: &NetworkId,
    ) -> Result<(), StoreError> {
        let mut rows = self.rows.write();
        let row = rows
            .iter_mut()
            .find(|(owner, row)| owner == user && &row.network_id == network)
            .map(|(_, row)| row)
            .ok_or_else(|| StoreError::NotFound {
                network: network.clone(),
            })?;
        row.status = ConnectionStatus::Disconnected;
        Ok(())
    }
}
