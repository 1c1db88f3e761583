//! Authentication strategies and their registry.
//!
//! One strategy per [`nexus_core::AuthMethod`], each with its own async flow
//! and failure modes, dispatched by exact method match. External capabilities
//! (wallet session, authorization surface, signer extension) enter through
//! the collaborator traits in [`context`]; strategies never talk to the
//! outside world directly.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod account;
mod context;
mod handle;
mod keypair;
mod oauth;
mod registry;
mod wallet;

pub use account::*;
pub use context::*;
pub use handle::*;
pub use keypair::*;
pub use oauth::*;
pub use registry::*;
pub use wallet::*;
