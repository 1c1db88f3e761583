//! Signer-extension strategy (Nostr).

use std::sync::Arc;

use async_trait::async_trait;

use nexus_core::{AuthError, AuthMethod, CredentialPayload, Network};

use crate::{AuthStrategy, CredentialInput, SignerExtension};

/// Requests the public key from a browser signer extension.
pub struct KeypairStrategy {
    extension: Option<Arc<dyn SignerExtension>>,
}

impl KeypairStrategy {
    /// Create a strategy over the extension capability, if one is present.
    #[must_use]
    pub fn new(extension: Option<Arc<dyn SignerExtension>>) -> Self {
        Self { extension }
    }
}

#[async_trait]
impl AuthStrategy for KeypairStrategy {
    fn method(&self) -> AuthMethod {
        AuthMethod::Keypair
    }

    async fn authenticate(
        &self,
        network: &Network,
        _input: &CredentialInput,
    ) -> Result<CredentialPayload, AuthError> {
        let extension = self.extension.as_ref().ok_or_else(|| {
            AuthError::MissingPrerequisite {
                message: "signer extension not found; install a Nostr browser extension".into(),
            }
        })?;

        let public_key = extension.public_key().await.map_err(|err| {
            tracing::warn!(network = %network.id, error = %err, "signer extension failed");
            AuthError::external("signer extension", err.to_string())
        })?;

        Ok(CredentialPayload::Keypair { public_key })
    }
}
