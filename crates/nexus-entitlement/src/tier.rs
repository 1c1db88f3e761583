//! Subscription tiers and their fixed limit sets.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A usage limit: a bounded count or the unbounded sentinel.
///
/// Serializes as a plain number, or `null` for unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<u32>", into = "Option<u32>")]
pub enum Limit {
    Bounded(u32),
    Unbounded,
}

impl Limit {
    /// Whether a usage count of `current` still leaves room under this limit.
    ///
    /// An unbounded limit is always satisfied.
    #[must_use]
    pub const fn allows(&self, current: u32) -> bool {
        match self {
            Self::Bounded(max) => current < *max,
            Self::Unbounded => true,
        }
    }

    /// Room left under this limit at a usage count of `current`.
    #[must_use]
    pub const fn remaining(&self, current: u32) -> Self {
        match self {
            Self::Bounded(max) => Self::Bounded(max.saturating_sub(current)),
            Self::Unbounded => Self::Unbounded,
        }
    }

    /// Whether a usage count of `current` has reached this limit.
    #[must_use]
    pub const fn reached(&self, current: u32) -> bool {
        match self {
            Self::Bounded(max) => current >= *max,
            Self::Unbounded => false,
        }
    }

    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        matches!(self, Self::Unbounded)
    }
}

impl From<Option<u32>> for Limit {
    fn from(value: Option<u32>) -> Self {
        value.map_or(Self::Unbounded, Self::Bounded)
    }
}

impl From<Limit> for Option<u32> {
    fn from(value: Limit) -> Self {
        match value {
            Limit::Bounded(max) => Some(max),
            Limit::Unbounded => None,
        }
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounded(max) => write!(f, "{max}"),
            Self::Unbounded => write!(f, "unlimited"),
        }
    }
}

/// The limit set attached to a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierLimits {
    /// Simultaneously connected networks.
    pub max_networks: Limit,

    /// Posts fetched into the unified feed per day.
    pub max_posts_per_day: Limit,

    /// Access to the analytics dashboard.
    pub analytics: bool,

    /// Real-time feed updates.
    pub real_time: bool,

    /// Programmatic API access.
    pub api_access: bool,
}

const FREE_LIMITS: TierLimits = TierLimits {
    max_networks: Limit::Bounded(1),
    max_posts_per_day: Limit::Bounded(100),
    analytics: false,
    real_time: false,
    api_access: false,
};

const PRO_LIMITS: TierLimits = TierLimits {
    max_networks: Limit::Bounded(5),
    max_posts_per_day: Limit::Bounded(1000),
    analytics: true,
    real_time: true,
    api_access: false,
};

const BUSINESS_LIMITS: TierLimits = TierLimits {
    max_networks: Limit::Unbounded,
    max_posts_per_day: Limit::Unbounded,
    analytics: true,
    real_time: true,
    api_access: true,
};

/// Subscription tier, strictly ordered for upgrade comparisons.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    #[default]
    Free,
    Pro,
    Business,
}

impl Tier {
    /// Every tier, in upgrade order.
    pub const ALL: [Self; 3] = [Self::Free, Self::Pro, Self::Business];

    /// The fixed limit set for this tier.
    #[must_use]
    pub const fn limits(&self) -> &'static TierLimits {
        match self {
            Self::Free => &FREE_LIMITS,
            Self::Pro => &PRO_LIMITS,
            Self::Business => &BUSINESS_LIMITS,
        }
    }

    /// The next tier in upgrade order, or `None` at the top.
    #[must_use]
    pub const fn next(&self) -> Option<Self> {
        match self {
            Self::Free => Some(Self::Pro),
            Self::Pro => Some(Self::Business),
            Self::Business => None,
        }
    }

    /// Display name for plan pickers.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Free => "Free",
            Self::Pro => "Pro",
            Self::Business => "Business",
        }
    }

    /// Monthly price in whole US dollars.
    #[must_use]
    pub const fn price_usd(&self) -> u32 {
        match self {
            Self::Free => 0,
            Self::Pro => 5,
            Self::Business => 20,
        }
    }

    /// Get the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
            Self::Business => "business",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_are_strictly_ordered() {
        assert!(Tier::Free < Tier::Pro);
        assert!(Tier::Pro < Tier::Business);
    }

    #[test]
    fn limit_table_matches_plan_sheet() {
        assert_eq!(Tier::Free.limits().max_networks, Limit::Bounded(1));
        assert_eq!(Tier::Free.limits().max_posts_per_day, Limit::Bounded(100));
        assert!(!Tier::Free.limits().analytics);

        assert_eq!(Tier::Pro.limits().max_networks, Limit::Bounded(5));
        assert!(Tier::Pro.limits().real_time);
        assert!(!Tier::Pro.limits().api_access);

        assert!(Tier::Business.limits().max_networks.is_unbounded());
        assert!(Tier::Business.limits().max_posts_per_day.is_unbounded());
        assert!(Tier::Business.limits().api_access);
    }

    #[test]
    fn next_walks_the_upgrade_order() {
        assert_eq!(Tier::Free.next(), Some(Tier::Pro));
        assert_eq!(Tier::Pro.next(), Some(Tier::Business));
        assert_eq!(Tier::Business.next(), None);
    }

    #[test]
    fn prices_match_plan_sheet() {
        assert_eq!(Tier::Free.price_usd(), 0);
        assert_eq!(Tier::Pro.price_usd(), 5);
        assert_eq!(Tier::Business.price_usd(), 20);
    }

    #[test]
    fn bounded_limit_allows_below_max_only() {
        let limit = Limit::Bounded(2);
        assert!(limit.allows(0));
        assert!(limit.allows(1));
        assert!(!limit.allows(2));
        assert!(!limit.allows(3));
        assert!(limit.reached(2));
    }

    #[test]
    fn unbounded_limit_is_always_satisfied() {
        assert!(Limit::Unbounded.allows(u32::MAX));
        assert!(!Limit::Unbounded.reached(u32::MAX));
        assert_eq!(Limit::Unbounded.remaining(100), Limit::Unbounded);
    }

    #[test]
    fn remaining_saturates_at_zero() {
        assert_eq!(Limit::Bounded(1).remaining(0), Limit::Bounded(1));
        assert_eq!(Limit::Bounded(1).remaining(1), Limit::Bounded(0));
        assert_eq!(Limit::Bounded(1).remaining(5), Limit::Bounded(0));
    }

    #[test]
    fn limit_serializes_as_number_or_null() {
        assert_eq!(serde_json::to_string(&Limit::Bounded(5)).unwrap(), "5");
        assert_eq!(serde_json::to_string(&Limit::Unbounded).unwrap(), "null");

        let bounded: Limit = serde_json::from_str("5").unwrap();
        assert_eq!(bounded, Limit::Bounded(5));
        let unbounded: Limit = serde_json::from_str("null").unwrap();
        assert_eq!(unbounded, Limit::Unbounded);
    }

    #[test]
    fn tier_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Tier::Business).unwrap(), "\"business\"");
        let back: Tier = serde_json::from_str("\"pro\"").unwrap();
        assert_eq!(back, Tier::Pro);
    }
}
