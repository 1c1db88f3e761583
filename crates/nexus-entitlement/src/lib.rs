//! Tiered feature gating and usage-limit enforcement.
//!
//! The entitlement engine gates the connection orchestrator: a network
//! connection is admitted only when the user's tier has a free network slot,
//! and the admission check and the slot reservation execute as one atomic
//! step so concurrent attempts cannot both squeeze past the limit.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod engine;
mod feature;
mod tier;
mod usage;

pub use engine::*;
pub use feature::*;
pub use tier::*;
pub use usage::*;
