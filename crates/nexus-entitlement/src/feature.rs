//! Feature keys and cumulative tier access.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Tier;

/// A gated product feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    BasicFeed,
    NetworkDirectory,
    SingleNetwork,
    MultipleNetworks,
    RealTimeUpdates,
    AdvancedAnalytics,
    ApiAccess,
    PrioritySupport,
}

impl Feature {
    /// Every feature key.
    pub const ALL: [Self; 8] = [
        Self::BasicFeed,
        Self::NetworkDirectory,
        Self::SingleNetwork,
        Self::MultipleNetworks,
        Self::RealTimeUpdates,
        Self::AdvancedAnalytics,
        Self::ApiAccess,
        Self::PrioritySupport,
    ];

    /// The lowest tier that includes this feature.
    #[must_use]
    pub const fn minimum_tier(&self) -> Tier {
        match self {
            Self::BasicFeed | Self::NetworkDirectory | Self::SingleNetwork => Tier::Free,
            Self::MultipleNetworks
            | Self::RealTimeUpdates
            | Self::AdvancedAnalytics
            | Self::PrioritySupport => Tier::Pro,
            Self::ApiAccess => Tier::Business,
        }
    }

    /// Get the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BasicFeed => "basic_feed",
            Self::NetworkDirectory => "network_directory",
            Self::SingleNetwork => "single_network",
            Self::MultipleNetworks => "multiple_networks",
            Self::RealTimeUpdates => "real_time_updates",
            Self::AdvancedAnalytics => "advanced_analytics",
            Self::ApiAccess => "api_access",
            Self::PrioritySupport => "priority_support",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether `tier` includes `feature`.
///
/// Access is cumulative: everything available at a tier is available at every
/// higher tier, and Business passes every key.
#[must_use]
pub fn has_feature_access(tier: Tier, feature: Feature) -> bool {
    tier >= feature.minimum_tier()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_tier_gets_the_basics_only() {
        assert!(has_feature_access(Tier::Free, Feature::BasicFeed));
        assert!(has_feature_access(Tier::Free, Feature::NetworkDirectory));
        assert!(has_feature_access(Tier::Free, Feature::SingleNetwork));
        assert!(!has_feature_access(Tier::Free, Feature::MultipleNetworks));
        assert!(!has_feature_access(Tier::Free, Feature::ApiAccess));
    }

    #[test]
    fn access_is_cumulative_across_tiers() {
        for feature in Feature::ALL {
            if has_feature_access(Tier::Free, feature) {
                assert!(has_feature_access(Tier::Pro, feature));
            }
            if has_feature_access(Tier::Pro, feature) {
                assert!(has_feature_access(Tier::Business, feature));
            }
        }
    }

    #[test]
    fn business_passes_every_key() {
        for feature in Feature::ALL {
            assert!(has_feature_access(Tier::Business, feature));
        }
    }

    #[test]
    fn api_access_is_business_only() {
        assert!(!has_feature_access(Tier::Pro, Feature::ApiAccess));
        assert!(has_feature_access(Tier::Business, Feature::ApiAccess));
    }
}
