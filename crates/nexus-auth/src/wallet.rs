//! Wallet-address strategy (Farcaster, Lens).

use async_trait::async_trait;

use nexus_core::{AuthError, AuthMethod, CredentialPayload, Network};

use crate::{AuthStrategy, CredentialInput};

/// Wraps the caller-supplied wallet address into a credential.
///
/// The address comes from the wallet-connection collaborator via the
/// orchestrator; no remote call is made here.
pub struct WalletStrategy;

#[async_trait]
impl AuthStrategy for WalletStrategy {
    fn method(&self) -> AuthMethod {
        AuthMethod::Wallet
    }

    async fn authenticate(
        &self,
        _network: &Network,
        input: &CredentialInput,
    ) -> Result<CredentialPayload, AuthError> {
        let address = input.wallet_address.clone().ok_or_else(|| {
            AuthError::MissingPrerequisite {
                message: "wallet address is required for wallet authentication".into(),
            }
        })?;
        Ok(CredentialPayload::Wallet { address })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_core::{NetworkDirectory, NetworkId};

    fn farcaster() -> Network {
        NetworkDirectory::builtin()
            .get(&NetworkId::parse("farcaster").unwrap())
            .unwrap()
            .clone()
    }

    #[tokio::test]
    async fn resolves_immediately_with_the_supplied_address() {
        let input = CredentialInput::new().with_wallet_address("0xdeadbeef");
        let payload = WalletStrategy
            .authenticate(&farcaster(), &input)
            .await
            .unwrap();
        assert_eq!(
            payload,
            CredentialPayload::Wallet {
                address: "0xdeadbeef".into()
            }
        );
    }

    #[tokio::test]
    async fn missing_address_is_a_missing_prerequisite() {
        let err = WalletStrategy
            .authenticate(&farcaster(), &CredentialInput::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "missing_prerequisite");
    }
}
