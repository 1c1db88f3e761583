//! Authentication error taxonomy.
//!
//! Strategy-level errors are forwarded, never transformed: the orchestrator
//! carries the kind and message into its error state for display.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::AuthMethod;

/// Everything that can go wrong between opening an attempt and persisting a
/// connection.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuthError {
    /// An external capability the method depends on is absent (wallet not
    /// connected, signer extension not installed).
    #[error("missing prerequisite: {message}")]
    MissingPrerequisite { message: String },

    /// A required field is blank or malformed. Raised before any strategy
    /// call.
    #[error("validation failed: {message}")]
    Validation {
        /// The offending field, when one can be named.
        #[serde(skip_serializing_if = "Option::is_none")]
        field: Option<String>,
        message: String,
    },

    /// The user dismissed the external authorization surface.
    #[error("cancelled by user")]
    UserCancelled,

    /// No strategy is registered for the network's method.
    #[error("authentication method {method} not supported")]
    UnsupportedMethod { method: AuthMethod },

    /// A remote service, extension, or the persistence collaborator failed.
    #[error("{service} failed: {message}")]
    ExternalService { service: String, message: String },

    /// The tier's usage limit blocks the operation. Raised before any
    /// strategy call.
    #[error("entitlement exceeded: {message}")]
    EntitlementExceeded { message: String },
}

impl AuthError {
    /// Build a validation error naming the offending field.
    #[must_use]
    pub fn validation_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Build a validation error without a field.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            field: None,
            message: message.into(),
        }
    }

    /// Build an external-service error.
    #[must_use]
    pub fn external(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalService {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Stable kind tag for display and logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MissingPrerequisite { .. } => "missing_prerequisite",
            Self::Validation { .. } => "validation",
            Self::UserCancelled => "user_cancelled",
            Self::UnsupportedMethod { .. } => "unsupported_method",
            Self::ExternalService { .. } => "external_service",
            Self::EntitlementExceeded { .. } => "entitlement_exceeded",
        }
    }

    /// Whether retrying the same attempt could succeed without the user
    /// changing anything.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ExternalService { .. })
    }
}
