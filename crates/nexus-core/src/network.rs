//! Network records and the builtin directory.
//!
//! A [`Network`] describes one decentralized social platform with exactly one
//! authentication method. The record is immutable for the process lifetime;
//! the [`NetworkDirectory`] is an ordered, read-only collection seeded from
//! static data.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─────────────────────────────────────────────────────────────────────────────
// Authentication Method
// ─────────────────────────────────────────────────────────────────────────────

/// How a network authenticates its users.
///
/// The set of methods is closed: adding or removing one is a compile-time
/// change that every exhaustive match in the workspace must account for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    /// Web3 wallet address supplied by a wallet session (Farcaster, Lens).
    Wallet,

    /// Authorization-code exchange through an external surface (Mastodon).
    Oauth,

    /// Public key requested from a browser signer extension (Nostr).
    Keypair,

    /// Bare handle accepted without remote verification (Bluesky).
    Handle,

    /// Username plus pod URL (Diaspora).
    Account,
}

impl AuthMethod {
    /// Every known method, in catalog order.
    pub const ALL: [Self; 5] = [
        Self::Wallet,
        Self::Oauth,
        Self::Keypair,
        Self::Handle,
        Self::Account,
    ];

    /// Get the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Wallet => "wallet",
            Self::Oauth => "oauth",
            Self::Keypair => "keypair",
            Self::Handle => "handle",
            Self::Account => "account",
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Identifiers
// ─────────────────────────────────────────────────────────────────────────────

/// Canonical network identifier.
///
/// Lowercase ASCII alphanumerics plus `-` and `_`, non-empty.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkId(String);

impl NetworkId {
    /// Parse a `NetworkId` from a string.
    ///
    /// # Errors
    /// Returns an error if the string is empty or contains characters outside
    /// `[a-z0-9_-]`.
    pub fn parse(s: &str) -> Result<Self, InvalidNetworkId> {
        if s.is_empty() {
            return Err(InvalidNetworkId {
                value: s.to_string(),
            });
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
        {
            return Err(InvalidNetworkId {
                value: s.to_string(),
            });
        }
        Ok(Self(s.to_string()))
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for NetworkId {
    type Err = InvalidNetworkId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NetworkId").field(&self.0).finish()
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Malformed network identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid network id `{value}`")]
pub struct InvalidNetworkId {
    /// The rejected input.
    pub value: String,
}

/// Canonical user identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Create a new random `UserId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `UserId` from a UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Parse a `UserId` from a string.
    ///
    /// # Errors
    /// Returns an error if the string is not a valid UUID.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UserId").field(&self.0.to_string()).finish()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Network Record
// ─────────────────────────────────────────────────────────────────────────────

/// Rollout status of a network in the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkStatus {
    Active,
    Beta,
}

impl NetworkStatus {
    /// Get the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Beta => "beta",
        }
    }
}

impl fmt::Display for NetworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A decentralized social platform reachable through one authentication method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    /// Stable identifier, unique within the directory.
    pub id: NetworkId,

    /// Human-readable name.
    pub name: String,

    /// Short description shown before connecting.
    pub description: String,

    /// Base URL of the network's primary client.
    pub url: String,

    /// Approximate user count, display form (e.g. "50K+").
    pub user_count: String,

    /// Rollout status.
    pub status: NetworkStatus,

    /// Marketing feature highlights.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,

    /// Link to the network's API documentation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_documentation_url: Option<String>,

    /// The single authentication method this network supports.
    pub auth_method: AuthMethod,
}

// ─────────────────────────────────────────────────────────────────────────────
// Network Directory
// ─────────────────────────────────────────────────────────────────────────────

/// Ordered, read-only collection of networks.
#[derive(Debug, Clone)]
pub struct NetworkDirectory {
    networks: Vec<Network>,
}

impl NetworkDirectory {
    /// Build a directory from an explicit list.
    #[must_use]
    pub fn new(networks: Vec<Network>) -> Self {
        Self { networks }
    }

    /// The six production networks.
    #[must_use]
    pub fn builtin() -> Self {
        fn id(s: &str) -> NetworkId {
            NetworkId(s.to_string())
        }

        Self::new(vec![
            Network {
                id: id("farcaster"),
                name: "Farcaster".into(),
                description: "A sufficiently decentralized social network built on Ethereum. \
                              Connect with crypto natives and builders in the space."
                    .into(),
                url: "https://warpcast.com".into(),
                user_count: "50K+".into(),
                status: NetworkStatus::Active,
                features: vec![
                    "Decentralized".into(),
                    "Crypto Native".into(),
                    "Open Protocol".into(),
                    "Real-time".into(),
                ],
                api_documentation_url: Some("https://docs.farcaster.xyz".into()),
                auth_method: AuthMethod::Wallet,
            },
            Network {
                id: id("lens"),
                name: "Lens Protocol".into(),
                description: "A composable and decentralized social graph that puts creators \
                              in control of their content and audience."
                    .into(),
                url: "https://lenster.xyz".into(),
                user_count: "100K+".into(),
                status: NetworkStatus::Active,
                features: vec![
                    "Composable".into(),
                    "Creator Economy".into(),
                    "NFT Integration".into(),
                    "Modular".into(),
                ],
                api_documentation_url: Some("https://docs.lens.xyz".into()),
                auth_method: AuthMethod::Wallet,
            },
            Network {
                id: id("nostr"),
                name: "Nostr".into(),
                description: "A simple, open protocol that enables global, decentralized, and \
                              censorship-resistant social media."
                    .into(),
                url: "https://nostr.com".into(),
                user_count: "25K+".into(),
                status: NetworkStatus::Active,
                features: vec![
                    "Censorship Resistant".into(),
                    "Simple Protocol".into(),
                    "Global".into(),
                    "Lightning Integration".into(),
                ],
                api_documentation_url: Some(
                    "https://github.com/nostr-protocol/nostr".into(),
                ),
                auth_method: AuthMethod::Keypair,
            },
            Network {
                id: id("mastodon"),
                name: "Mastodon".into(),
                description: "A decentralized microblogging platform that connects independent \
                              communities across the fediverse."
                    .into(),
                url: "https://mastodon.social".into(),
                user_count: "2M+".into(),
                status: NetworkStatus::Active,
                features: vec![
                    "Federated".into(),
                    "Open Source".into(),
                    "Community Driven".into(),
                    "Ad-free".into(),
                ],
                api_documentation_url: Some("https://docs.joinmastodon.org".into()),
                auth_method: AuthMethod::Oauth,
            },
            Network {
                id: id("bluesky"),
                name: "Bluesky".into(),
                description: "A new social network built on the AT Protocol, focusing on \
                              algorithmic choice and interoperability."
                    .into(),
                url: "https://bsky.app".into(),
                user_count: "500K+".into(),
                status: NetworkStatus::Beta,
                features: vec![
                    "AT Protocol".into(),
                    "Algorithmic Choice".into(),
                    "Interoperable".into(),
                    "Open".into(),
                ],
                api_documentation_url: Some("https://atproto.com".into()),
                auth_method: AuthMethod::Handle,
            },
            Network {
                id: id("diaspora"),
                name: "Diaspora".into(),
                description: "A privacy-aware, distributed, open source social network that \
                              puts you in control of your data."
                    .into(),
                url: "https://diasporafoundation.org".into(),
                user_count: "750K+".into(),
                status: NetworkStatus::Active,
                features: vec![
                    "Privacy Focused".into(),
                    "Distributed".into(),
                    "Open Source".into(),
                    "Data Control".into(),
                ],
                api_documentation_url: Some(
                    "https://diaspora.github.io/diaspora_federation/".into(),
                ),
                auth_method: AuthMethod::Account,
            },
        ])
    }

    /// Look up a network by id.
    #[must_use]
    pub fn get(&self, id: &NetworkId) -> Option<&Network> {
        self.networks.iter().find(|n| &n.id == id)
    }

    /// Iterate networks in directory order.
    pub fn iter(&self) -> impl Iterator<Item = &Network> {
        self.networks.iter()
    }

    /// Number of networks in the directory.
    #[must_use]
    pub fn len(&self) -> usize {
        self.networks.len()
    }

    /// Whether the directory is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}

impl<'a> IntoIterator for &'a NetworkDirectory {
    type Item = &'a Network;
    type IntoIter = std::slice::Iter<'a, Network>;

    fn into_iter(self) -> Self::IntoIter {
        self.networks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_id_accepts_lowercase_and_separators() {
        assert!(NetworkId::parse("farcaster").is_ok());
        assert!(NetworkId::parse("my-network_2").is_ok());
    }

    #[test]
    fn network_id_rejects_empty_and_uppercase() {
        assert!(NetworkId::parse("").is_err());
        assert!(NetworkId::parse("Farcaster").is_err());
        assert!(NetworkId::parse("has space").is_err());
    }

    #[test]
    fn user_id_parse_roundtrip() {
        let id = UserId::new();
        let parsed = UserId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn auth_method_serializes_snake_case() {
        let json = serde_json::to_string(&AuthMethod::Keypair).unwrap();
        assert_eq!(json, "\"keypair\"");
        let back: AuthMethod = serde_json::from_str("\"wallet\"").unwrap();
        assert_eq!(back, AuthMethod::Wallet);
    }

    #[test]
    fn builtin_directory_has_six_networks_in_order() {
        let dir = NetworkDirectory::builtin();
        assert_eq!(dir.len(), 6);

        let ids: Vec<&str> = dir.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["farcaster", "lens", "nostr", "mastodon", "bluesky", "diaspora"]
        );
    }

    #[test]
    fn builtin_directory_method_assignment() {
        let dir = NetworkDirectory::builtin();
        let method = |id: &str| dir.get(&NetworkId::parse(id).unwrap()).unwrap().auth_method;

        assert_eq!(method("farcaster"), AuthMethod::Wallet);
        assert_eq!(method("lens"), AuthMethod::Wallet);
        assert_eq!(method("nostr"), AuthMethod::Keypair);
        assert_eq!(method("mastodon"), AuthMethod::Oauth);
        assert_eq!(method("bluesky"), AuthMethod::Handle);
        assert_eq!(method("diaspora"), AuthMethod::Account);
    }

    #[test]
    fn directory_lookup_miss_is_none() {
        let dir = NetworkDirectory::builtin();
        assert!(dir.get(&NetworkId::parse("myspace").unwrap()).is_none());
    }
}
