//! Username-plus-pod strategy (Diaspora).

use async_trait::async_trait;

use nexus_core::{AuthError, AuthMethod, CredentialPayload, Network};

use crate::{AuthStrategy, CredentialInput};

/// Accepts a username and home-pod URL.
pub struct AccountStrategy;

#[async_trait]
impl AuthStrategy for AccountStrategy {
    fn method(&self) -> AuthMethod {
        AuthMethod::Account
    }

    async fn authenticate(
        &self,
        _network: &Network,
        input: &CredentialInput,
    ) -> Result<CredentialPayload, AuthError> {
        let username = input
            .field("username")
            .ok_or_else(|| AuthError::validation_field("username", "Username is required"))?;
        let pod = input
            .field("pod")
            .ok_or_else(|| AuthError::validation_field("pod", "Pod URL is required"))?;
        Ok(CredentialPayload::Account {
            username: username.to_string(),
            pod: pod.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diaspora() -> Network {
        nexus_core::NetworkDirectory::builtin()
            .get(&nexus_core::NetworkId::parse("diaspora").unwrap())
            .unwrap()
            .clone()
    }

    #[tokio::test]
    async fn username_and_pod_resolve_to_an_account() {
        let input = CredentialInput::new()
            .with_field("username", "alice")
            .with_field("pod", "https://pod.example");
        let payload = AccountStrategy
            .authenticate(&diaspora(), &input)
            .await
            .unwrap();
        assert_eq!(
            payload,
            CredentialPayload::Account {
                username: "alice".into(),
                pod: "https://pod.example".into()
            }
        );
    }

    #[tokio::test]
    async fn either_blank_field_is_a_validation_error() {
        let input = CredentialInput::new().with_field("username", "alice");
        let err = AccountStrategy
            .authenticate(&diaspora(), &input)
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::validation_field("pod", "Pod URL is required"));

        let input = CredentialInput::new()
            .with_field("username", "  ")
            .with_field("pod", "https://pod.example");
        let err = AccountStrategy
            .authenticate(&diaspora(), &input)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            AuthError::validation_field("username", "Username is required")
        );
    }
}
