//! Per-attempt connection state machine.
//!
//! One [`ConnectionAttempt`] exists per open connection dialog. Transitions
//! are validated centrally. The epoch counter implements best-effort
//! cancellation: closing an attempt bumps the epoch, so a strategy that
//! resolves late finds its completion refused instead of mutating a closed
//! attempt.

use std::fmt;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use nexus_core::{requirements, AuthError, ConnectionRequirement, Network};

/// State of one connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AttemptState {
    /// No dialog open.
    #[default]
    Idle,

    /// Showing requirements and collecting form input.
    Requirements,

    /// A strategy call is in flight.
    Connecting,

    /// The connection was persisted.
    Success,

    /// The attempt failed; the error is retained for display.
    Error,
}

impl AttemptState {
    /// Get the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Requirements => "requirements",
            Self::Connecting => "connecting",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for AttemptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Attempt state machine misuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid attempt transition: {from} -> {to}")]
pub struct InvalidTransition {
    /// State the attempt was in.
    pub from: AttemptState,

    /// State the caller asked for.
    pub to: AttemptState,
}

/// Check whether `from -> to` is a legal transition.
///
/// # Errors
/// Returns the offending pair when it is not.
pub const fn validate_transition(
    from: AttemptState,
    to: AttemptState,
) -> Result<(), InvalidTransition> {
    let allowed = matches!(
        (from, to),
        (AttemptState::Idle, AttemptState::Requirements)
            | (AttemptState::Requirements, AttemptState::Connecting)
            | (AttemptState::Connecting, AttemptState::Success | AttemptState::Error)
            | (AttemptState::Error, AttemptState::Requirements)
            | (_, AttemptState::Idle)
    );
    if allowed {
        Ok(())
    } else {
        Err(InvalidTransition { from, to })
    }
}

#[derive(Debug)]
struct AttemptInner {
    state: AttemptState,
    epoch: u64,
    last_error: Option<AuthError>,
}

/// One connection attempt against one network.
#[derive(Debug)]
pub struct ConnectionAttempt {
    network: Network,
    requirement: &'static ConnectionRequirement,
    inner: Mutex<AttemptInner>,
}

impl ConnectionAttempt {
    /// Create an attempt in `Idle` for the given network.
    #[must_use]
    pub fn new(network: Network) -> Self {
        let requirement = requirements(network.auth_method);
        Self {
            network,
            requirement,
            inner: Mutex::new(AttemptInner {
                state: AttemptState::Idle,
                epoch: 0,
                last_error: None,
            }),
        }
    }

    /// The network this attempt targets.
    #[must_use]
    pub const fn network(&self) -> &Network {
        &self.network
    }

    /// The catalog entry for the network's method.
    #[must_use]
    pub const fn requirement(&self) -> &'static ConnectionRequirement {
        self.requirement
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> AttemptState {
        self.inner.lock().state
    }

    /// Current epoch. Bumped on close; completions from older epochs are
    /// refused.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.inner.lock().epoch
    }

    /// The error retained for display, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<AuthError> {
        self.inner.lock().last_error.clone()
    }

    /// `Idle -> Requirements`: dialog opened, form state reset.
    ///
    /// # Errors
    /// Returns `InvalidTransition` when not in `Idle`.
    pub fn open(&self) -> Result<(), InvalidTransition> {
        let mut inner = self.inner.lock();
        validate_transition(inner.state, AttemptState::Requirements)?;
        inner.state = AttemptState::Requirements;
        inner.last_error = None;
        Ok(())
    }

    /// `Requirements -> Connecting`: preconditions passed, strategy about to
    /// run. Returns the epoch the strategy call belongs to.
    ///
    /// # Errors
    /// Returns `InvalidTransition` when not in `Requirements`.
    pub fn begin_connecting(&self) -> Result<u64, InvalidTransition> {
        let mut inner = self.inner.lock();
        validate_transition(inner.state, AttemptState::Connecting)?;
        inner.state = AttemptState::Connecting;
        inner.last_error = None;
        Ok(inner.epoch)
    }

    /// Record a precondition failure. The attempt stays in `Requirements`;
    /// the error is retained for display.
    pub fn record_rejection(&self, error: AuthError) {
        let mut inner = self.inner.lock();
        inner.last_error = Some(error);
    }

    /// `Connecting -> Success` for the given epoch.
    ///
    /// Returns `false` when the attempt was closed (or re-opened) since the
    /// strategy call started; the completion must then be discarded.
    pub fn complete(&self, epoch: u64) -> bool {
        let mut inner = self.inner.lock();
        if inner.epoch != epoch || inner.state != AttemptState::Connecting {
            return false;
        }
        inner.state = AttemptState::Success;
        true
    }

    /// `Connecting -> Error` for the given epoch, retaining the error.
    ///
    /// Returns `false` when the attempt was closed since the strategy call
    /// started.
    pub fn fail(&self, epoch: u64, error: AuthError) -> bool {
        let mut inner = self.inner.lock();
        if inner.epoch != epoch || inner.state != AttemptState::Connecting {
            return false;
        }
        inner.state = AttemptState::Error;
        inner.last_error = Some(error);
        true
    }

    /// `Error -> Requirements`: explicit retry, clearing the prior error.
    ///
    /// # Errors
    /// Returns `InvalidTransition` when not in `Error`.
    pub fn retry(&self) -> Result<(), InvalidTransition> {
        let mut inner = self.inner.lock();
        if inner.state != AttemptState::Error {
            return Err(InvalidTransition {
                from: inner.state,
                to: AttemptState::Requirements,
            });
        }
        inner.state = AttemptState::Requirements;
        inner.last_error = None;
        Ok(())
    }

    /// Any state `-> Idle`: close or cancel. Bumps the epoch so in-flight
    /// strategy calls cannot act on this attempt when they resolve.
    pub fn close(&self) {
        let mut inner = self.inner.lock();
        inner.state = AttemptState::Idle;
        inner.epoch += 1;
        inner.last_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_core::{NetworkDirectory, NetworkId};

    fn attempt_for(network: &str) -> ConnectionAttempt {
        let network = NetworkDirectory::builtin()
            .get(&NetworkId::parse(network).unwrap())
            .unwrap()
            .clone();
        ConnectionAttempt::new(network)
    }

    #[test]
    fn happy_path_walks_the_machine() {
        let attempt = attempt_for("bluesky");
        assert_eq!(attempt.state(), AttemptState::Idle);

        attempt.open().unwrap();
        assert_eq!(attempt.state(), AttemptState::Requirements);

        let epoch = attempt.begin_connecting().unwrap();
        assert_eq!(attempt.state(), AttemptState::Connecting);

        assert!(attempt.complete(epoch));
        assert_eq!(attempt.state(), AttemptState::Success);
    }

    #[test]
    fn connecting_requires_requirements() {
        let attempt = attempt_for("bluesky");
        let err = attempt.begin_connecting().unwrap_err();
        assert_eq!(err.from, AttemptState::Idle);
        assert_eq!(err.to, AttemptState::Connecting);
    }

    #[test]
    fn retry_clears_the_error_and_returns_to_requirements() {
        let attempt = attempt_for("bluesky");
        attempt.open().unwrap();
        let epoch = attempt.begin_connecting().unwrap();
        assert!(attempt.fail(epoch, AuthError::UserCancelled));
        assert_eq!(attempt.state(), AttemptState::Error);
        assert_eq!(attempt.last_error(), Some(AuthError::UserCancelled));

        attempt.retry().unwrap();
        assert_eq!(attempt.state(), AttemptState::Requirements);
        assert!(attempt.last_error().is_none());
    }

    #[test]
    fn retry_outside_error_is_invalid() {
        let attempt = attempt_for("bluesky");
        attempt.open().unwrap();
        assert!(attempt.retry().is_err());
    }

    #[test]
    fn close_is_legal_from_every_state() {
        for setup in 0..4 {
            let attempt = attempt_for("bluesky");
            if setup >= 1 {
                attempt.open().unwrap();
            }
            if setup >= 2 {
                attempt.begin_connecting().unwrap();
            }
            if setup >= 3 {
                attempt.fail(0, AuthError::UserCancelled);
            }
            attempt.close();
            assert_eq!(attempt.state(), AttemptState::Idle);
        }
    }

    #[test]
    fn close_refuses_late_completions() {
        let attempt = attempt_for("bluesky");
        attempt.open().unwrap();
        let epoch = attempt.begin_connecting().unwrap();

        attempt.close();
        assert!(!attempt.complete(epoch));
        assert!(!attempt.fail(epoch, AuthError::UserCancelled));
        assert_eq!(attempt.state(), AttemptState::Idle);
    }

    #[test]
    fn rejection_keeps_the_attempt_in_requirements() {
        let attempt = attempt_for("bluesky");
        attempt.open().unwrap();
        attempt.record_rejection(AuthError::validation_field("handle", "Handle is required"));
        assert_eq!(attempt.state(), AttemptState::Requirements);
        assert!(attempt.last_error().is_some());
    }

    #[test]
    fn requirement_follows_the_network_method() {
        let attempt = attempt_for("diaspora");
        assert_eq!(attempt.requirement().title, "Account Details");
    }
}
