//! Strategy trait and method-keyed registry.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use nexus_core::{AuthError, AuthMethod, CredentialPayload, Network};

use crate::{
    AccountStrategy, AuthorizationBroker, CredentialInput, HandleStrategy, KeypairStrategy,
    OauthConfig, OauthStrategy, SignerExtension, WalletStrategy,
};

/// One authentication flow, selected by exact method match.
#[async_trait]
pub trait AuthStrategy: Send + Sync {
    /// The method this strategy implements.
    fn method(&self) -> AuthMethod;

    /// Run the authentication exchange and produce a credential payload.
    ///
    /// # Errors
    /// Strategy-specific; see the per-method implementations. Errors are
    /// forwarded to the caller untransformed.
    async fn authenticate(
        &self,
        network: &Network,
        input: &CredentialInput,
    ) -> Result<CredentialPayload, AuthError>;
}

/// Maps an authentication method to its strategy.
#[derive(Default)]
pub struct StrategyRegistry {
    strategies: HashMap<AuthMethod, Arc<dyn AuthStrategy>>,
}

impl StrategyRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with all five production strategies.
    #[must_use]
    pub fn with_defaults(
        broker: Arc<dyn AuthorizationBroker>,
        extension: Option<Arc<dyn SignerExtension>>,
        oauth: OauthConfig,
    ) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(WalletStrategy));
        registry.register(Arc::new(OauthStrategy::new(broker, oauth)));
        registry.register(Arc::new(KeypairStrategy::new(extension)));
        registry.register(Arc::new(HandleStrategy));
        registry.register(Arc::new(AccountStrategy));
        registry
    }

    /// Register a strategy under its own method, replacing any previous one.
    pub fn register(&mut self, strategy: Arc<dyn AuthStrategy>) {
        self.strategies.insert(strategy.method(), strategy);
    }

    /// Whether a strategy is registered for `method`.
    #[must_use]
    pub fn supports(&self, method: AuthMethod) -> bool {
        self.strategies.contains_key(&method)
    }

    /// Dispatch to the strategy for the network's method.
    ///
    /// # Errors
    /// Returns `UnsupportedMethod` when no strategy is registered; otherwise
    /// whatever the strategy returns.
    pub async fn authenticate(
        &self,
        network: &Network,
        input: &CredentialInput,
    ) -> Result<CredentialPayload, AuthError> {
        let strategy = self.strategies.get(&network.auth_method).ok_or(
            AuthError::UnsupportedMethod {
                method: network.auth_method,
            },
        )?;
        tracing::debug!(network = %network.id, method = %network.auth_method, "dispatching strategy");
        strategy.authenticate(network, input).await
    }
}
