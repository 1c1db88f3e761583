//! Collaborator traits and per-attempt credential input.
//!
//! Strategies are pure over these seams: the wallet session, the
//! authorization surface, and the signer extension are supplied by the
//! embedding application, and tests script them.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use url::Url;

// ─────────────────────────────────────────────────────────────────────────────
// Wallet Session
// ─────────────────────────────────────────────────────────────────────────────

/// The wallet-connection collaborator.
pub trait WalletSession: Send + Sync {
    /// Address of the connected wallet, if any.
    fn address(&self) -> Option<String>;

    /// Whether a wallet is currently connected.
    fn is_connected(&self) -> bool {
        self.address().is_some()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Surface
// ─────────────────────────────────────────────────────────────────────────────

/// A message posted to the application from an authorization surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginMessage {
    /// Origin of the posting window.
    pub origin: String,

    /// The authorization outcome it reports.
    pub message: AuthMessage,
}

/// Outcome reported by an authorization surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthMessage {
    /// The user authorized the application.
    Authorized { access_token: String },

    /// The network reported an authorization failure.
    Failed { error: String },
}

/// Handle on an externally-opened authorization surface (popup analog).
///
/// `close` must be idempotent; the strategy closes the surface on every exit
/// path, including surfaces the user already closed.
pub trait AuthorizationSurface: Send + Sync {
    /// Whether the surface has been closed.
    fn is_closed(&self) -> bool;

    /// Close the surface.
    fn close(&self);
}

/// An open authorization surface plus its message channel.
pub struct AuthorizationWindow {
    /// The surface itself, polled for closure.
    pub surface: Arc<dyn AuthorizationSurface>,

    /// Messages posted back to the application.
    pub messages: mpsc::Receiver<OriginMessage>,
}

/// Failure to open an authorization surface.
#[derive(Debug, Clone, thiserror::Error)]
#[error("authorization surface failed to open: {message}")]
pub struct BrokerError {
    /// What went wrong.
    pub message: String,
}

/// Opens authorization surfaces on behalf of the oauth strategy.
#[async_trait]
pub trait AuthorizationBroker: Send + Sync {
    /// Open a surface pointed at the authorize URL.
    async fn open(&self, url: &Url) -> Result<AuthorizationWindow, BrokerError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Signer Extension
// ─────────────────────────────────────────────────────────────────────────────

/// Failure reported by a signer extension.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExtensionError {
    /// The extension refused the request.
    #[error("signer extension rejected the request: {message}")]
    Rejected { message: String },

    /// The extension did not respond.
    #[error("signer extension did not respond")]
    Unresponsive,
}

/// Browser signer-extension capability (`window.nostr` analog).
#[async_trait]
pub trait SignerExtension: Send + Sync {
    /// Request the user's public key.
    async fn public_key(&self) -> Result<String, ExtensionError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Credential Input
// ─────────────────────────────────────────────────────────────────────────────

/// Caller-supplied input for one connection attempt.
#[derive(Debug, Clone, Default)]
pub struct CredentialInput {
    /// Address injected from the wallet session, for wallet-method networks.
    pub wallet_address: Option<String>,

    fields: HashMap<String, String>,
}

impl CredentialInput {
    /// Empty input.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the wallet address.
    #[must_use]
    pub fn with_wallet_address(mut self, address: impl Into<String>) -> Self {
        self.wallet_address = Some(address.into());
        self
    }

    /// Set one form field.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// The trimmed value of a field, only when non-empty after trimming.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }
}
