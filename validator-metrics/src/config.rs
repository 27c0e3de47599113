//! Exporter configuration.
//!
//! This module aggregates:
//!
//! - process-wide [`Settings`] (chain identity, addresses, denomination),
//! - the chain data client's transport knobs ([`ClientConfig`]),
//! - the refresh orchestrator's limits ([`RefreshConfig`]).
//!
//! All of it is resolved once at startup and read-only afterwards.

use std::collections::HashMap;
use std::time::Duration;

/// Exponent used when neither the command line nor the chain registry
/// provides one.
pub const DEFAULT_EXPONENT: u32 = 6;

/// Maximum number of bonded validators fetched when computing rank.
pub const DEFAULT_VALIDATOR_PAGE_LIMIT: u32 = 400;

/// Denomination metadata published by a chain registry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChainMetadata {
    pub denom: Option<String>,
    pub symbol: Option<String>,
    pub decimals: Option<u32>,
}

/// Process-wide, immutable settings.
///
/// Addresses and the denomination are optional: when one is missing the
/// metrics that need it fail on every scrape while the rest keep working.
#[derive(Clone, Debug, Default)]
pub struct Settings {
    /// Chain id, e.g. `"cosmoshub-4"`.
    pub chain: Option<String>,
    /// Chain registry name, e.g. `"cosmoshub"`.
    pub project_name: Option<String>,
    pub friendly_name: Option<String>,
    /// Free-form network type, e.g. `"mainnet"`.
    pub network_type: Option<String>,
    /// Base URL of the node's REST API, without a trailing slash.
    pub api: String,
    pub operator_address: Option<String>,
    pub wallet_address: Option<String>,
    pub consensus_address: Option<String>,
    pub denom: Option<String>,
    pub symbol: Option<String>,
    /// Decimal exponent; see [`Settings::exponent`].
    pub exponent: Option<u32>,
    pub port: u16,
}

impl Settings {
    /// Exponent used to scale token amounts, falling back to
    /// [`DEFAULT_EXPONENT`].
    pub fn exponent(&self) -> u32 {
        self.exponent.unwrap_or(DEFAULT_EXPONENT)
    }

    /// Fills denomination fields that were not set explicitly.
    ///
    /// Values already present (command-line overrides) always win.
    pub fn merge_chain_metadata(&mut self, meta: ChainMetadata) {
        if self.denom.is_none() {
            self.denom = meta.denom;
        }
        if self.symbol.is_none() {
            self.symbol = meta.symbol;
        }
        if self.exponent.is_none() {
            self.exponent = meta.decimals;
        }
    }

    /// Labels attached to every exported metric.
    ///
    /// Unset values are left out rather than exported as empty strings.
    pub fn default_labels(&self) -> HashMap<String, String> {
        let mut labels = HashMap::new();
        labels.insert("port".to_string(), self.port.to_string());

        let optional = [
            ("chain", &self.chain),
            ("project_name", &self.project_name),
            ("friendly_name", &self.friendly_name),
            ("network_type", &self.network_type),
        ];
        for (name, value) in optional {
            if let Some(value) = value.as_ref().filter(|v| !v.is_empty()) {
                labels.insert(name.to_string(), value.clone());
            }
        }
        labels
    }
}

/// Configuration for the REST clients.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Page size for the bonded validator set.
    pub validator_page_limit: u32,
    /// Base URL of the chain registry used for denomination metadata.
    pub chain_registry_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            validator_page_limit: DEFAULT_VALIDATOR_PAGE_LIMIT,
            chain_registry_url: "https://chains.cosmos.directory".to_string(),
        }
    }
}

/// Configuration for the refresh orchestrator.
#[derive(Clone, Debug)]
pub struct RefreshConfig {
    /// Upper bound on the fetch stage of one scrape. Groups still running at
    /// the deadline are skipped for that cycle.
    pub scrape_deadline: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            scrape_deadline: Duration::from_secs(25),
        }
    }
}
