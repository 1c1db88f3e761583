//! Credential payloads produced by authentication strategies.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::AuthMethod;

/// The credential material a strategy resolves to, one shape per method.
///
/// The oauth access token is secret material: the `Debug` impl redacts it so
/// payloads can be logged at state transitions without leaking the token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CredentialPayload {
    /// Wallet address from a connected wallet session.
    Wallet {
        /// Checksummed wallet address.
        address: String,
    },

    /// Access token from an authorization-code exchange.
    Oauth {
        /// Bearer token granted by the network.
        access_token: String,
    },

    /// Public key from a signer extension.
    Keypair {
        /// Hex-encoded public key.
        public_key: String,
    },

    /// Self-declared handle, format-accepted only.
    Handle {
        /// Handle string, e.g. `username.bsky.social`.
        handle: String,
    },

    /// Username plus home pod.
    Account {
        /// Account username on the pod.
        username: String,
        /// Pod base URL.
        pod: String,
    },
}

impl CredentialPayload {
    /// The method this payload belongs to.
    #[must_use]
    pub const fn method(&self) -> AuthMethod {
        match self {
            Self::Wallet { .. } => AuthMethod::Wallet,
            Self::Oauth { .. } => AuthMethod::Oauth,
            Self::Keypair { .. } => AuthMethod::Keypair,
            Self::Handle { .. } => AuthMethod::Handle,
            Self::Account { .. } => AuthMethod::Account,
        }
    }
}

impl fmt::Debug for CredentialPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wallet { address } => f.debug_struct("Wallet").field("address", address).finish(),
            Self::Oauth { .. } => f
                .debug_struct("Oauth")
                .field("access_token", &"<redacted>")
                .finish(),
            Self::Keypair { public_key } => f
                .debug_struct("Keypair")
                .field("public_key", public_key)
                .finish(),
            Self::Handle { handle } => f.debug_struct("Handle").field("handle", handle).finish(),
            Self::Account { username, pod } => f
                .debug_struct("Account")
                .field("username", username)
                .field("pod", pod)
                .finish(),
        }
    }
}
