//! Authorization-code strategy (Mastodon).
//!
//! Opens an authorization surface through the broker and races two
//! observers: a fixed-interval poll of the surface's closed flag, and the
//! surface's message channel. Whichever fires first decides the outcome; the
//! race is one future, so the losing observer is torn down when it returns.
//! An overall timeout bounds the race so an unresponsive surface cannot leave
//! the attempt pending forever.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use nexus_core::{AuthError, AuthMethod, CredentialPayload, Network};

use crate::{AuthMessage, AuthStrategy, AuthorizationBroker, CredentialInput};

/// Configuration for the oauth strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OauthConfig {
    /// Client id sent in the authorize URL.
    pub client_id: String,

    /// Application origin: both the redirect target and the only origin
    /// authorization messages are accepted from.
    pub app_origin: String,

    /// Scope requested from the network.
    pub scope: String,

    /// Interval between closed-surface polls (milliseconds).
    ///
    /// Default: 1000ms (1 second).
    pub poll_interval_ms: u64,

    /// Overall bound on the authorization race (milliseconds).
    ///
    /// Default: 120000ms (2 minutes).
    pub timeout_ms: u64,
}

impl Default for OauthConfig {
    fn default() -> Self {
        Self {
            client_id: "nexusfeed".into(),
            app_origin: "https://app.nexusfeed.io".into(),
            scope: "read".into(),
            poll_interval_ms: 1_000,
            timeout_ms: 120_000,
        }
    }
}

impl OauthConfig {
    /// Interval between closed-surface polls.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Overall bound on the authorization race.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Drives the popup-and-callback authorization exchange.
pub struct OauthStrategy {
    broker: Arc<dyn AuthorizationBroker>,
    config: OauthConfig,
}

impl OauthStrategy {
    /// Create a strategy over the given broker.
    #[must_use]
    pub fn new(broker: Arc<dyn AuthorizationBroker>, config: OauthConfig) -> Self {
        Self { broker, config }
    }

    /// Build the authorize URL from the network's base URL.
    ///
    /// # Errors
    /// Returns a validation error when the network URL does not parse.
    pub fn authorize_url(&self, network: &Network) -> Result<Url, AuthError> {
        let base = Url::parse(&network.url).map_err(|err| {
            AuthError::validation_field("url", format!("network url is not valid: {err}"))
        })?;
        let mut url = base.join("/oauth/authorize").map_err(|err| {
            AuthError::validation_field("url", format!("network url is not valid: {err}"))
        })?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.app_origin)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.config.scope);

        Ok(url)
    }
}

#[async_trait]
impl AuthStrategy for OauthStrategy {
    fn method(&self) -> AuthMethod {
        AuthMethod::Oauth
    }

    async fn authenticate(
        &self,
        network: &Network,
        _input: &CredentialInput,
    ) -> Result<CredentialPayload, AuthError> {
        let url = self.authorize_url(network)?;

        let window = self
            .broker
            .open(&url)
            .await
            .map_err(|err| AuthError::external("authorization", err.to_string()))?;
        let surface = window.surface;
        let mut messages = window.messages;

        tracing::info!(network = %network.id, "authorization surface opened");

        let mut poll = tokio::time::interval(self.config.poll_interval());
        let mut channel_open = true;

        let race = async {
            loop {
                tokio::select! {
                    _ = poll.tick() => {
                        if surface.is_closed() {
                            return Err(AuthError::UserCancelled);
                        }
                    }
                    received = messages.recv(), if channel_open => match received {
                        Some(posted) if posted.origin == self.config.app_origin => {
                            match posted.message {
                                AuthMessage::Authorized { access_token } => {
                                    return Ok(CredentialPayload::Oauth { access_token });
                                }
                                AuthMessage::Failed { error } => {
                                    return Err(AuthError::external("authorization", error));
                                }
                            }
                        }
                        Some(posted) => {
                            tracing::debug!(
                                origin = %posted.origin,
                                "ignoring authorization message from foreign origin"
                            );
                        }
                        None => {
                            // Sender gone without a decision; only the close
                            // poll or the timeout can settle the race now.
                            channel_open = false;
                        }
                    }
                }
            }
        };

        let outcome = match tokio::time::timeout(self.config.timeout(), race).await {
            Ok(outcome) => outcome,
            Err(_) => Err(AuthError::external(
                "authorization",
                "authorization timed out",
            )),
        };

        // Both observers are torn down here; close the surface on every exit
        // path (idempotent for surfaces the user already closed).
        surface.close();

        if let Err(err) = &outcome {
            tracing::info!(network = %network.id, kind = err.kind(), "authorization failed");
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AuthorizationSurface, AuthorizationWindow, BrokerError, OriginMessage};
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::mpsc;

    struct FlagSurface {
        closed: AtomicBool,
    }

    impl AuthorizationSurface for FlagSurface {
        fn is_closed(&self) -> bool {
            self.closed.load(Ordering::SeqCst)
        }

        fn close(&self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    struct ScriptedBroker {
        surface: Arc<FlagSurface>,
        sender: std::sync::Mutex<Option<mpsc::Sender<OriginMessage>>>,
        receiver: std::sync::Mutex<Option<mpsc::Receiver<OriginMessage>>>,
    }

    impl ScriptedBroker {
        fn new() -> Self {
            let (sender, receiver) = mpsc::channel(8);
            Self {
                surface: Arc::new(FlagSurface {
                    closed: AtomicBool::new(false),
                }),
                sender: std::sync::Mutex::new(Some(sender)),
                receiver: std::sync::Mutex::new(Some(receiver)),
            }
        }

        fn sender(&self) -> mpsc::Sender<OriginMessage> {
            self.sender.lock().unwrap().clone().unwrap()
        }

        fn drop_sender(&self) {
            self.sender.lock().unwrap().take();
        }
    }

    #[async_trait]
    impl AuthorizationBroker for ScriptedBroker {
        async fn open(&self, _url: &Url) -> Result<AuthorizationWindow, BrokerError> {
            let receiver = self
                .receiver
                .lock()
                .unwrap()
                .take()
                .ok_or_else(|| BrokerError {
                    message: "window already open".into(),
                })?;
            Ok(AuthorizationWindow {
                surface: self.surface.clone(),
                messages: receiver,
            })
        }
    }

    fn mastodon() -> Network {
        nexus_core::NetworkDirectory::builtin()
            .get(&nexus_core::NetworkId::parse("mastodon").unwrap())
            .unwrap()
            .clone()
    }

    fn strategy_over(broker: &Arc<ScriptedBroker>) -> OauthStrategy {
        OauthStrategy::new(broker.clone(), OauthConfig::default())
    }

    #[test]
    fn authorize_url_carries_the_exchange_parameters() {
        let broker = Arc::new(ScriptedBroker::new());
        let url = strategy_over(&broker).authorize_url(&mastodon()).unwrap();

        assert_eq!(url.host_str(), Some("mastodon.social"));
        assert_eq!(url.path(), "/oauth/authorize");

        let query: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(query.contains(&("client_id".into(), "nexusfeed".into())));
        assert!(query.contains(&("response_type".into(), "code".into())));
        assert!(query.contains(&("scope".into(), "read".into())));
        assert!(query.contains(&("redirect_uri".into(), "https://app.nexusfeed.io".into())));
    }

    #[tokio::test(start_paused = true)]
    async fn same_origin_authorization_resolves_to_a_token() {
        let broker = Arc::new(ScriptedBroker::new());
        let strategy = strategy_over(&broker);
        let sender = broker.sender();

        let attempt = tokio::spawn(async move {
            strategy
                .authenticate(&mastodon(), &CredentialInput::new())
                .await
        });

        sender
            .send(OriginMessage {
                origin: "https://app.nexusfeed.io".into(),
                message: AuthMessage::Authorized {
                    access_token: "tok-123".into(),
                },
            })
            .await
            .unwrap();

        let payload = attempt.await.unwrap().unwrap();
        assert_eq!(
            payload,
            CredentialPayload::Oauth {
                access_token: "tok-123".into()
            }
        );
        assert!(broker.surface.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn foreign_origin_messages_are_ignored() {
        let broker = Arc::new(ScriptedBroker::new());
        let strategy = strategy_over(&broker);
        let sender = broker.sender();

        let attempt = tokio::spawn(async move {
            strategy
                .authenticate(&mastodon(), &CredentialInput::new())
                .await
        });

        sender
            .send(OriginMessage {
                origin: "https://evil.example".into(),
                message: AuthMessage::Authorized {
                    access_token: "stolen".into(),
                },
            })
            .await
            .unwrap();
        sender
            .send(OriginMessage {
                origin: "https://app.nexusfeed.io".into(),
                message: AuthMessage::Authorized {
                    access_token: "genuine".into(),
                },
            })
            .await
            .unwrap();

        let payload = attempt.await.unwrap().unwrap();
        assert_eq!(
            payload,
            CredentialPayload::Oauth {
                access_token: "genuine".into()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn closed_surface_without_a_message_is_user_cancelled() {
        let broker = Arc::new(ScriptedBroker::new());
        let strategy = strategy_over(&broker);
        broker.surface.close();

        let err = strategy
            .authenticate(&mastodon(), &CredentialInput::new())
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::UserCancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn reported_failure_maps_to_external_service() {
        let broker = Arc::new(ScriptedBroker::new());
        let strategy = strategy_over(&broker);
        let sender = broker.sender();

        let attempt = tokio::spawn(async move {
            strategy
                .authenticate(&mastodon(), &CredentialInput::new())
                .await
        });

        sender
            .send(OriginMessage {
                origin: "https://app.nexusfeed.io".into(),
                message: AuthMessage::Failed {
                    error: "access denied".into(),
                },
            })
            .await
            .unwrap();

        let err = attempt.await.unwrap().unwrap_err();
        assert_eq!(err.kind(), "external_service");
        assert!(err.to_string().contains("access denied"));
    }

    #[tokio::test(start_paused = true)]
    async fn unresponsive_surface_times_out() {
        let broker = Arc::new(ScriptedBroker::new());
        let strategy = strategy_over(&broker);
        // Keep the sender alive but silent; the surface never closes.
        let _sender = broker.sender();

        let err = strategy
            .authenticate(&mastodon(), &CredentialInput::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "external_service");
        assert!(err.to_string().contains("timed out"));
        assert!(broker.surface.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_channel_still_settles_via_the_close_poll() {
        let broker = Arc::new(ScriptedBroker::new());
        let strategy = strategy_over(&broker);
        broker.drop_sender();

        let surface = broker.surface.clone();
        let attempt = tokio::spawn(async move {
            strategy
                .authenticate(&mastodon(), &CredentialInput::new())
                .await
        });

        // Let a couple of polls pass with the surface open, then close it.
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        surface.close();

        let err = attempt.await.unwrap().unwrap_err();
        assert_eq!(err, AuthError::UserCancelled);
    }
}
