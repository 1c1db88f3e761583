//! Per-method connection requirements catalog.
//!
//! Static descriptors consumed by the orchestrator to validate form input and
//! to list human-readable prerequisites before an attempt. The lookup is total
//! over [`AuthMethod`]: a method without a catalog entry cannot exist.

use serde::Serialize;

use crate::AuthMethod;

/// Input widget kind for a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Text,
    Url,
}

/// One form field a method requires from the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    /// Key used in the credential input map.
    pub name: &'static str,

    /// Label shown next to the field.
    pub label: &'static str,

    /// Widget kind.
    pub input: InputKind,

    /// Placeholder hint.
    pub placeholder: &'static str,

    /// Whether the field must be non-empty after trimming.
    pub required: bool,
}

/// Static descriptor of what connecting via one method requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConnectionRequirement {
    /// Short title for the connection dialog.
    pub title: &'static str,

    /// One-line description of the exchange.
    pub description: &'static str,

    /// Form fields to collect, possibly empty.
    pub fields: &'static [FieldSpec],

    /// Human-readable prerequisites to show before attempting.
    pub prerequisites: &'static [&'static str],
}

impl ConnectionRequirement {
    /// Fields that must be present and non-empty after trimming.
    pub fn required_fields(&self) -> impl Iterator<Item = &'static FieldSpec> {
        self.fields.iter().filter(|f| f.required)
    }
}

const WALLET: ConnectionRequirement = ConnectionRequirement {
    title: "Wallet Connection",
    description: "Connect your Web3 wallet to authenticate",
    fields: &[],
    prerequisites: &["Web3 wallet (MetaMask, WalletConnect, etc.)"],
};

const OAUTH: ConnectionRequirement = ConnectionRequirement {
    title: "OAuth Authentication",
    description: "Authorize NexusFeed to access your account",
    fields: &[],
    prerequisites: &["Active account on the network"],
};

const KEYPAIR: ConnectionRequirement = ConnectionRequirement {
    title: "Nostr Extension",
    description: "Use your Nostr browser extension to connect",
    fields: &[],
    prerequisites: &["Nostr browser extension (nos2x, Alby, etc.)"],
};

const HANDLE: ConnectionRequirement = ConnectionRequirement {
    title: "Handle Authentication",
    description: "Enter your Bluesky handle to connect",
    fields: &[FieldSpec {
        name: "handle",
        label: "Handle",
        input: InputKind::Text,
        placeholder: "username.bsky.social",
        required: true,
    }],
    prerequisites: &["Active Bluesky account"],
};

const ACCOUNT: ConnectionRequirement = ConnectionRequirement {
    title: "Account Details",
    description: "Enter your Diaspora account information",
    fields: &[
        FieldSpec {
            name: "username",
            label: "Username",
            input: InputKind::Text,
            placeholder: "your-username",
            required: true,
        },
        FieldSpec {
            name: "pod",
            label: "Pod URL",
            input: InputKind::Url,
            placeholder: "https://diaspora.pod.com",
            required: true,
        },
    ],
    prerequisites: &["Active Diaspora account"],
};

/// Look up the catalog entry for a method.
#[must_use]
pub const fn requirements(method: AuthMethod) -> &'static ConnectionRequirement {
    match method {
        AuthMethod::Wallet => &WALLET,
        AuthMethod::Oauth => &OAUTH,
        AuthMethod::Keypair => &KEYPAIR,
        AuthMethod::Handle => &HANDLE,
        AuthMethod::Account => &ACCOUNT,
    }
}
