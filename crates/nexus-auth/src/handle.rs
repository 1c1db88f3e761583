//! Handle strategy (Bluesky).

use async_trait::async_trait;

use nexus_core::{AuthError, AuthMethod, CredentialPayload, Network};

use crate::{AuthStrategy, CredentialInput};

/// Accepts a self-declared handle.
///
/// Format acceptance only: no remote verification of account existence.
pub struct HandleStrategy;

#[async_trait]
impl AuthStrategy for HandleStrategy {
    fn method(&self) -> AuthMethod {
        AuthMethod::Handle
    }

    async fn authenticate(
        &self,
        _network: &Network,
        input: &CredentialInput,
    ) -> Result<CredentialPayload, AuthError> {
        let handle = input
            .field("handle")
            .ok_or_else(|| AuthError::validation_field("handle", "Handle is required"))?;
        Ok(CredentialPayload::Handle {
            handle: handle.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bluesky() -> Network {
        nexus_core::NetworkDirectory::builtin()
            .get(&nexus_core::NetworkId::parse("bluesky").unwrap())
            .unwrap()
            .clone()
    }

    #[tokio::test]
    async fn non_empty_handle_resolves_immediately() {
        let input = CredentialInput::new().with_field("handle", " alice.bsky.social ");
        let payload = HandleStrategy
            .authenticate(&bluesky(), &input)
            .await
            .unwrap();
        assert_eq!(
            payload,
            CredentialPayload::Handle {
                handle: "alice.bsky.social".into()
            }
        );
    }

    #[tokio::test]
    async fn blank_handle_is_a_validation_error() {
        let input = CredentialInput::new().with_field("handle", "   ");
        let err = HandleStrategy
            .authenticate(&bluesky(), &input)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            AuthError::validation_field("handle", "Handle is required")
        );
    }
}
