//! The entitlement engine and its pure predicates.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use async_trait::async_trait;
use nexus_core::{AuthError, UserId};

use crate::{has_feature_access, Feature, Limit, Tier, UsageCounters, UsageKind, UsageLedger};

// ─────────────────────────────────────────────────────────────────────────────
// Subscription Record
// ─────────────────────────────────────────────────────────────────────────────

/// What the subscription collaborator knows about a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    /// The tier the user pays for.
    pub tier: Tier,

    /// Whether the subscription is currently active.
    pub is_active: bool,
}

/// Subscription lookup failure.
#[derive(Debug, Clone, thiserror::Error)]
#[error("subscription lookup failed: {message}")]
pub struct ProviderError {
    /// What went wrong.
    pub message: String,
}

/// External subscription store, consulted at session start.
#[async_trait]
pub trait SubscriptionProvider: Send + Sync {
    /// Fetch the user's subscription record, if any.
    async fn subscription(&self, user: &UserId)
        -> Result<Option<SubscriptionRecord>, ProviderError>;
}

/// The tier a subscription record resolves to.
///
/// Absent or inactive records fall back to `Free`.
#[must_use]
pub fn current_tier(record: Option<&SubscriptionRecord>) -> Tier {
    match record {
        Some(record) if record.is_active => record.tier,
        _ => Tier::Free,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Pure Predicates
// ─────────────────────────────────────────────────────────────────────────────

/// Whether `usage` leaves room for another network connection under `tier`.
#[must_use]
pub fn can_connect_more(tier: Tier, usage: &UsageCounters) -> bool {
    tier.limits().max_networks.allows(usage.networks_connected)
}

/// Network slots left under `tier` at the given usage.
#[must_use]
pub fn remaining_networks(tier: Tier, usage: &UsageCounters) -> Limit {
    tier.limits().max_networks.remaining(usage.networks_connected)
}

/// Per-kind limit check.
///
/// `Api` is a capability check, not a counter comparison: a tier without API
/// access is always at the limit.
#[must_use]
pub fn is_at_limit(tier: Tier, usage: &UsageCounters, kind: UsageKind) -> bool {
    let limits = tier.limits();
    match kind {
        UsageKind::Networks => limits.max_networks.reached(usage.networks_connected),
        UsageKind::Posts => limits.max_posts_per_day.reached(usage.posts_fetched_today),
        UsageKind::Api => !limits.api_access,
    }
}

/// The next tier in upgrade order, or `None` at the top.
#[must_use]
pub const fn upgrade_target(tier: Tier) -> Option<Tier> {
    tier.next()
}

// ─────────────────────────────────────────────────────────────────────────────
// Upgrade Prompt
// ─────────────────────────────────────────────────────────────────────────────

/// Copy shown when a limit blocks the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpgradePrompt {
    pub title: &'static str,
    pub message: &'static str,
    pub target_tier: Tier,
    pub price_usd: u32,
}

/// The upgrade prompt for a tier, or `None` at Business.
#[must_use]
pub const fn upgrade_prompt(tier: Tier) -> Option<UpgradePrompt> {
    match tier {
        Tier::Free => Some(UpgradePrompt {
            title: "Upgrade to Pro",
            message: "Unlock advanced features and connect to more networks",
            target_tier: Tier::Pro,
            price_usd: Tier::Pro.price_usd(),
        }),
        Tier::Pro => Some(UpgradePrompt {
            title: "Upgrade to Business",
            message: "Get unlimited access and API integration",
            target_tier: Tier::Business,
            price_usd: Tier::Business.price_usd(),
        }),
        Tier::Business => None,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Entitlement Engine
// ─────────────────────────────────────────────────────────────────────────────

/// Owns the current tier and the usage ledger.
///
/// Admission control runs here: [`EntitlementEngine::admit_network`] checks
/// the network limit and reserves the slot in one atomic step, closing the
/// window where two concurrent attempts both read a pre-increment count.
#[derive(Debug)]
pub struct EntitlementEngine {
    tier: Mutex<Tier>,
    ledger: UsageLedger,
}

impl Default for EntitlementEngine {
    fn default() -> Self {
        Self::new(Tier::Free)
    }
}

impl EntitlementEngine {
    /// Create an engine at the given tier with zeroed usage.
    #[must_use]
    pub fn new(tier: Tier) -> Self {
        Self {
            tier: Mutex::new(tier),
            ledger: UsageLedger::new(),
        }
    }

    /// The current tier.
    #[must_use]
    pub fn tier(&self) -> Tier {
        *self.tier.lock()
    }

    /// Change the tier. Touches nothing else; usage carries over.
    pub fn set_tier(&self, tier: Tier) {
        *self.tier.lock() = tier;
    }

    /// Seed the tier from the subscription collaborator.
    ///
    /// Lookup failures fall back to `Free` rather than blocking the session.
    pub async fn load_subscription(
        &self,
        provider: &dyn SubscriptionProvider,
        user: &UserId,
    ) -> Tier {
        let tier = match provider.subscription(user).await {
            Ok(record) => current_tier(record.as_ref()),
            Err(err) => {
                tracing::warn!(user = %user, error = %err, "subscription lookup failed, defaulting to free");
                Tier::Free
            }
        };
        self.set_tier(tier);
        tier
    }

    /// Replace the usage counters with an authoritative snapshot.
    pub fn reconcile_usage(&self, counters: UsageCounters) {
        self.ledger.reconcile(counters);
    }

    /// Current usage snapshot.
    #[must_use]
    pub fn usage(&self) -> UsageCounters {
        self.ledger.snapshot()
    }

    /// Admit one new network connection, reserving the slot.
    ///
    /// The reservation is the `networks_connected` increment; every failure
    /// path after admission must call [`Self::release_network`].
    ///
    /// # Errors
    /// Returns `EntitlementExceeded` with an upgrade hint when the tier's
    /// network limit is reached.
    pub fn admit_network(&self) -> Result<(), AuthError> {
        let tier = self.tier();
        if self.ledger.try_reserve_network(tier.limits().max_networks) {
            tracing::debug!(tier = %tier, "network slot reserved");
            Ok(())
        } else {
            let message = match upgrade_prompt(tier) {
                Some(prompt) => format!(
                    "the {} plan allows {} connected network(s); upgrade to {} for more",
                    tier.display_name(),
                    tier.limits().max_networks,
                    prompt.target_tier.display_name(),
                ),
                None => format!(
                    "the {} plan allows {} connected network(s)",
                    tier.display_name(),
                    tier.limits().max_networks,
                ),
            };
            Err(AuthError::EntitlementExceeded { message })
        }
    }

    /// Hand back one reserved network slot.
    pub fn release_network(&self) {
        self.ledger.release_network();
    }

    /// Increment the named counter.
    pub fn track(&self, kind: UsageKind, amount: u32) {
        self.ledger.record(kind, amount);
    }

    /// Whether another network connection would be admitted right now.
    #[must_use]
    pub fn can_connect_more(&self) -> bool {
        can_connect_more(self.tier(), &self.usage())
    }

    /// Network slots left at the current tier and usage.
    #[must_use]
    pub fn remaining_networks(&self) -> Limit {
        remaining_networks(self.tier(), &self.usage())
    }

    /// Per-kind limit check at the current tier and usage.
    #[must_use]
    pub fn is_at_limit(&self, kind: UsageKind) -> bool {
        is_at_limit(self.tier(), &self.usage(), kind)
    }

    /// Whether the current tier includes `feature`.
    #[must_use]
    pub fn has_feature(&self, feature: Feature) -> bool {
        has_feature_access(self.tier(), feature)
    }
}
