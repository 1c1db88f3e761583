//! Unified-feed aggregation over connected networks.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use nexus_core::{NetworkId, UserId};
use nexus_entitlement::{EntitlementEngine, UsageKind};

use crate::{ConnectionStore, StoreError};

/// One post from one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Network-scoped post identifier.
    pub id: String,

    /// The network the post came from.
    pub network_id: NetworkId,

    /// Author identifier on that network.
    pub author: String,

    /// Post body.
    pub content: String,

    /// When the post was published.
    pub timestamp: DateTime<Utc>,

    pub likes: u32,
    pub replies: u32,
    pub reposts: u32,

    /// Link to the post on its home network.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
}

/// Feed aggregation failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FeedError {
    /// One post source failed.
    #[error("post source failed for {network}: {message}")]
    Source {
        network: NetworkId,
        message: String,
    },

    /// The connection store could not be read.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The per-network post fetcher collaborator.
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Fetch recent posts for one network.
    async fn fetch_posts(&self, network: &NetworkId) -> Result<Vec<Post>, FeedError>;
}

/// Merges posts from every connected network into one feed.
pub struct FeedAggregator {
    user: UserId,
    store: Arc<dyn ConnectionStore>,
    source: Arc<dyn PostSource>,
    entitlements: Arc<EntitlementEngine>,
}

impl FeedAggregator {
    /// Assemble an aggregator over its collaborators.
    #[must_use]
    pub fn new(
        user: UserId,
        store: Arc<dyn ConnectionStore>,
        source: Arc<dyn PostSource>,
        entitlements: Arc<EntitlementEngine>,
    ) -> Self {
        Self {
            user,
            store,
            source,
            entitlements,
        }
    }

    /// Fetch and merge posts from every active connection.
    ///
    /// Networks are fetched in connection order; a failing source is skipped
    /// with a warning rather than failing the whole feed. The merge is a
    /// stable sort by timestamp descending, so posts with equal timestamps
    /// keep their per-network fetch order. The fetched count is tracked
    /// against the daily posts limit.
    ///
    /// # Errors
    /// Returns a store error when the connection list cannot be read.
    pub async fn unified_feed(&self) -> Result<Vec<Post>, FeedError> {
        let connections = self.store.list_connections(&self.user).await?;

        let mut posts = Vec::new();
        for connection in connections.iter().filter(|c| c.is_active()) {
            match self.source.fetch_posts(&connection.network_id).await {
                Ok(fetched) => posts.extend(fetched),
                Err(err) => {
                    tracing::warn!(
                        network = %connection.network_id,
                        error = %err,
                        "post source failed, skipping network"
                    );
                }
            }
        }

        // Stable sort: ties keep per-network fetch order.
        posts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let fetched = u32::try_from(posts.len()).unwrap_or(u32::MAX);
        self.entitlements.track(UsageKind::Posts, fetched);
        tracing::debug!(count = posts.len(), "unified feed assembled");

        Ok(posts)
    }
}
