//! Core types for the NexusFeed network connection layer.
//!
//! This crate provides the data model shared by the authentication,
//! entitlement, and orchestration crates: network records and the builtin
//! directory, credential payloads, connection records with read-time status
//! derivation, the per-method connection requirements catalog, and the
//! authentication error taxonomy.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod connection;
mod credential;
mod error;
mod network;
mod requirements;

pub use connection::*;
pub use credential::*;
pub use error::*;
pub use network::*;
pub use requirements::*;

// Re-export commonly used external types
pub use chrono::{DateTime, Utc};
pub use uuid::Uuid;
