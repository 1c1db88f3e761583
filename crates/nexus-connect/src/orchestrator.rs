//! The connection orchestrator.
//!
//! One orchestrator per authenticated session. `connect` evaluates the
//! preconditions (idempotence, required fields, wallet prerequisite,
//! entitlement admission) before any strategy runs; a failing precondition
//! surfaces its specific reason and leaves no partial side effects.
//! Admission reserves the network slot atomically; every failure path after
//! it hands the slot back.

use std::sync::Arc;

use chrono::Utc;

use nexus_auth::{CredentialInput, StrategyRegistry, WalletSession};
use nexus_core::{
    derive_status, AuthError, AuthMethod, Connection, ConnectionStatus, NetworkDirectory,
    NetworkId, UserId,
};
use nexus_entitlement::EntitlementEngine;

use crate::{ConnectionAttempt, ConnectionStore, InvalidTransition, StoreError};

/// Failure of an orchestrator operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectError {
    /// An authentication-level failure; kind and message are retained for
    /// display.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The attempt was driven in the wrong state.
    #[error(transparent)]
    Attempt(#[from] InvalidTransition),

    /// The attempt was closed while the strategy was in flight; the late
    /// resolution was discarded.
    #[error("attempt closed before completion")]
    Superseded,
}

/// Drives connection attempts for one user session.
pub struct Orchestrator {
    user: UserId,
    directory: NetworkDirectory,
    registry: StrategyRegistry,
    entitlements: Arc<EntitlementEngine>,
    wallet: Arc<dyn WalletSession>,
    store: Arc<dyn ConnectionStore>,
}

impl Orchestrator {
    /// Assemble an orchestrator over its collaborators.
    #[must_use]
    pub fn new(
        user: UserId,
        directory: NetworkDirectory,
        registry: StrategyRegistry,
        entitlements: Arc<EntitlementEngine>,
        wallet: Arc<dyn WalletSession>,
        store: Arc<dyn ConnectionStore>,
    ) -> Self {
        Self {
            user,
            directory,
            registry,
            entitlements,
            wallet,
            store,
        }
    }

    /// The network directory this session sees.
    #[must_use]
    pub const fn directory(&self) -> &NetworkDirectory {
        &self.directory
    }

    /// The entitlement engine gating this session.
    #[must_use]
    pub fn entitlements(&self) -> &EntitlementEngine {
        &self.entitlements
    }

    /// Whether connecting to networks of this method can work at all:
    /// requires both a catalog entry (total by construction) and a registered
    /// strategy.
    #[must_use]
    pub fn is_supported(&self, method: AuthMethod) -> bool {
        self.registry.supports(method)
    }

    /// Open a connection attempt: resolve the directory entry, load the
    /// catalog descriptor, reset form state (`Idle -> Requirements`).
    ///
    /// # Errors
    /// Returns a validation error for an unknown network id.
    pub fn open(&self, network_id: &NetworkId) -> Result<Arc<ConnectionAttempt>, ConnectError> {
        let network = self
            .directory
            .get(network_id)
            .ok_or_else(|| AuthError::validation(format!("network {network_id} not found")))?
            .clone();

        let attempt = Arc::new(ConnectionAttempt::new(network));
        attempt.open()?;
        tracing::debug!(network = %network_id, "connection attempt opened");
        Ok(attempt)
    }

    /// Run the connect flow for an attempt in `Requirements`.
    ///
    /// Preconditions are checked in order: an existing active connection
    /// short-circuits to success; then required fields, the wallet
    /// prerequisite, and entitlement admission. Only when all pass does the
    /// strategy run.
    ///
    /// # Errors
    /// The specific precondition, strategy, or persistence failure;
    /// `Superseded` when the attempt was closed mid-flight.
    pub async fn connect(
        &self,
        attempt: &ConnectionAttempt,
        input: &CredentialInput,
    ) -> Result<Connection, ConnectError> {
        let network = attempt.network().clone();

        // Idempotence: an active connection for this network reports success
        // without touching the registry or the usage ledger.
        if let Some(existing) = self.active_connection(&network.id).await? {
            tracing::info!(network = %network.id, "already connected, reporting success");
            let epoch = attempt.begin_connecting()?;
            attempt.complete(epoch);
            return Ok(existing);
        }

        if let Err(err) = self.check_preconditions(attempt, input) {
            attempt.record_rejection(err.clone());
            return Err(err.into());
        }

        // Admission is the atomic check-and-reserve; from here on every
        // failure path must hand the slot back.
        if let Err(err) = self.entitlements.admit_network() {
            tracing::info!(network = %network.id, "connection blocked by entitlement limit");
            attempt.record_rejection(err.clone());
            return Err(err.into());
        }

        let epoch = match attempt.begin_connecting() {
            Ok(epoch) => epoch,
            Err(err) => {
                self.entitlements.release_network();
                return Err(err.into());
            }
        };
        tracing::info!(network = %network.id, method = %network.auth_method, "connecting");

        let input = self.with_wallet_address(&network, input);
        let payload = match self.registry.authenticate(&network, &input).await {
            Ok(payload) => payload,
            Err(err) => {
                self.entitlements.release_network();
                if attempt.fail(epoch, err.clone()) {
                    tracing::warn!(network = %network.id, kind = err.kind(), "connection failed");
                    return Err(err.into());
                }
                return Err(ConnectError::Superseded);
            }
        };

        // The attempt may have been closed while the strategy was suspended;
        // a late resolution must not persist anything.
        if attempt.epoch() != epoch {
            self.entitlements.release_network();
            return Err(ConnectError::Superseded);
        }

        let connection = Connection {
            network_id: network.id.clone(),
            method: network.auth_method,
            payload,
            connected_at: Utc::now(),
            status: ConnectionStatus::Connected,
        };

        match self.store.upsert_connection(&self.user, connection).await {
            Ok(persisted) => {
                if !attempt.complete(epoch) {
                    tracing::debug!(network = %network.id, "attempt closed after persist");
                }
                tracing::info!(network = %network.id, "connection established");
                Ok(persisted)
            }
            Err(err) => {
                self.entitlements.release_network();
                let err = AuthError::external("connection store", err.to_string());
                if attempt.fail(epoch, err.clone()) {
                    tracing::warn!(network = %network.id, "persist failed, connection not saved");
                    return Err(err.into());
                }
                Err(ConnectError::Superseded)
            }
        }
    }

    /// Explicit retry action: `Error -> Requirements`, clearing the error.
    ///
    /// # Errors
    /// Returns `InvalidTransition` when the attempt is not in `Error`.
    pub fn retry(&self, attempt: &ConnectionAttempt) -> Result<(), ConnectError> {
        attempt.retry()?;
        Ok(())
    }

    /// Explicit close action from any state. In-flight strategy calls are
    /// not aborted; their late resolutions are discarded.
    pub fn close(&self, attempt: &ConnectionAttempt) {
        attempt.close();
        tracing::debug!(network = %attempt.network().id, "connection attempt closed");
    }

    /// Mark the connection inactive and hand its network slot back.
    ///
    /// No strategy-specific revocation is performed.
    ///
    /// # Errors
    /// A validation error for an unknown pair; external-service for store
    /// failures.
    pub async fn disconnect(&self, network_id: &NetworkId) -> Result<(), AuthError> {
        match self.store.deactivate_connection(&self.user, network_id).await {
            Ok(()) => {
                self.entitlements.release_network();
                tracing::info!(network = %network_id, "disconnected");
                Ok(())
            }
            Err(StoreError::NotFound { network }) => Err(AuthError::validation(format!(
                "no connection for network {network}"
            ))),
            Err(err @ StoreError::Unavailable { .. }) => {
                Err(AuthError::external("connection store", err.to_string()))
            }
        }
    }

    /// The user's connections with read-time status derivation applied.
    ///
    /// # Errors
    /// External-service for store failures.
    pub async fn connections(&self) -> Result<Vec<Connection>, AuthError> {
        let now = Utc::now();
        let rows = self
            .store
            .list_connections(&self.user)
            .await
            .map_err(|err| AuthError::external("connection store", err.to_string()))?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let status = derive_status(&row, now);
                Connection { status, ..row }
            })
            .collect())
    }

    async fn active_connection(
        &self,
        network_id: &NetworkId,
    ) -> Result<Option<Connection>, AuthError> {
        let rows = self
            .store
            .list_connections(&self.user)
            .await
            .map_err(|err| AuthError::external("connection store", err.to_string()))?;
        Ok(rows
            .into_iter()
            .find(|row| &row.network_id == network_id && row.is_active()))
    }

    /// Required-field and wallet-prerequisite checks. Fail fast: no strategy
    /// runs and nothing is reserved on these paths.
    fn check_preconditions(
        &self,
        attempt: &ConnectionAttempt,
        input: &CredentialInput,
    ) -> Result<(), AuthError> {
        for field in attempt.requirement().required_fields() {
            if input.field(field.name).is_none() {
                return Err(AuthError::validation_field(
                    field.name,
                    format!("{} is required", field.label),
                ));
            }
        }

        if attempt.network().auth_method == AuthMethod::Wallet && !self.wallet.is_connected() {
            return Err(AuthError::MissingPrerequisite {
                message: "connect your wallet first".into(),
            });
        }

        Ok(())
    }

    fn with_wallet_address(
        &self,
        network: &nexus_core::Network,
        input: &CredentialInput,
    ) -> CredentialInput {
        let mut input = input.clone();
        if network.auth_method == AuthMethod::Wallet && input.wallet_address.is_none() {
            input.wallet_address = self.wallet.address();
        }
        input
    }
}
