//! Usage counters behind a single-writer ledger.
//!
//! Counters are a process-local cache of usage, not the system of record;
//! they are reconciled from the usage collaborator at session start. The
//! ledger owns them behind one mutex so that checking a limit and consuming a
//! slot is a single critical section, not two separate reads.

use std::fmt;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::Limit;

/// Snapshot of the user's current usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UsageCounters {
    /// Active network connections.
    pub networks_connected: u32,

    /// Posts fetched into the unified feed today.
    pub posts_fetched_today: u32,

    /// API calls made today.
    pub api_calls_today: u32,
}

/// Which counter an operation consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageKind {
    Networks,
    Posts,
    Api,
}

impl UsageKind {
    /// Get the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Networks => "networks",
            Self::Posts => "posts",
            Self::Api => "api",
        }
    }
}

impl fmt::Display for UsageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Mutex-guarded usage counters.
#[derive(Debug, Default)]
pub struct UsageLedger {
    counters: Mutex<UsageCounters>,
}

impl UsageLedger {
    /// Start from zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a known usage snapshot.
    #[must_use]
    pub fn with_counters(counters: UsageCounters) -> Self {
        Self {
            counters: Mutex::new(counters),
        }
    }

    /// Atomically check the network limit and, if it allows another
    /// connection, consume one slot.
    ///
    /// Returns `true` when the slot was reserved. The reservation is the
    /// `networks_connected` increment; callers that fail later must hand the
    /// slot back with [`Self::release_network`].
    pub fn try_reserve_network(&self, limit: Limit) -> bool {
        let mut counters = self.counters.lock();
        if limit.allows(counters.networks_connected) {
            counters.networks_connected += 1;
            true
        } else {
            false
        }
    }

    /// Hand back one previously reserved network slot.
    pub fn release_network(&self) {
        let mut counters = self.counters.lock();
        counters.networks_connected = counters.networks_connected.saturating_sub(1);
    }

    /// Increment the named counter.
    pub fn record(&self, kind: UsageKind, amount: u32) {
        let mut counters = self.counters.lock();
        let counter = match kind {
            UsageKind::Networks => &mut counters.networks_connected,
            UsageKind::Posts => &mut counters.posts_fetched_today,
            UsageKind::Api => &mut counters.api_calls_today,
        };
        *counter = counter.saturating_add(amount);
    }

    /// Replace the counters with an authoritative snapshot from the usage
    /// collaborator.
    pub fn reconcile(&self, counters: UsageCounters) {
        *self.counters.lock() = counters;
    }

    /// Current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> UsageCounters {
        *self.counters.lock()
    }
}
