//! Command-line configuration.
//!
//! Positional arguments follow the order operators already use in their
//! service files; every one of them can also come from an `EXPORTER_*`
//! environment variable.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use anyhow::{Result, bail};
use clap::Parser;

use validator_metrics::config::{
    ClientConfig, DEFAULT_VALIDATOR_PAGE_LIMIT, RefreshConfig, Settings,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Port to serve /metrics on.
    #[arg(env = "EXPORTER_PORT", default_value_t = 9100)]
    pub port: u16,

    /// Chain id, exported as the `chain` label.
    #[arg(env = "EXPORTER_CHAIN")]
    pub chain: Option<String>,

    /// Base URL of the node's REST API.
    #[arg(env = "EXPORTER_API")]
    pub api: Option<String>,

    #[arg(env = "EXPORTER_OPERATOR_ADDRESS")]
    pub operator_address: Option<String>,

    #[arg(env = "EXPORTER_WALLET_ADDRESS")]
    pub wallet_address: Option<String>,

    #[arg(env = "EXPORTER_CONSENSUS_ADDRESS")]
    pub consensus_address: Option<String>,

    /// Chain registry name; also used to look up denomination metadata.
    #[arg(env = "EXPORTER_PROJECT_NAME")]
    pub project_name: Option<String>,

    #[arg(env = "EXPORTER_FRIENDLY_NAME")]
    pub friendly_name: Option<String>,

    #[arg(env = "EXPORTER_NETWORK_TYPE")]
    pub network_type: Option<String>,

    /// Base denom, e.g. `uatom`. Overrides the chain registry.
    #[arg(env = "EXPORTER_DENOM")]
    pub denom: Option<String>,

    /// Decimal exponent of the display unit. Overrides the chain registry.
    #[arg(env = "EXPORTER_EXPONENT")]
    pub exponent: Option<u32>,

    #[arg(long, env = "EXPORTER_LISTEN_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub listen_host: IpAddr,

    /// Timeout of a single upstream request.
    #[arg(long, env = "EXPORTER_REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    pub request_timeout_secs: u64,

    /// Upper bound on the fetch stage of one scrape.
    #[arg(long, env = "EXPORTER_SCRAPE_DEADLINE_SECS", default_value_t = 25)]
    pub scrape_deadline_secs: u64,

    #[arg(long, env = "EXPORTER_CHAIN_REGISTRY_URL", default_value = "https://chains.cosmos.directory")]
    pub chain_registry_url: String,

    /// Page size used when ranking the bonded validator set.
    #[arg(long, env = "EXPORTER_VALIDATOR_PAGE_LIMIT", default_value_t = DEFAULT_VALIDATOR_PAGE_LIMIT)]
    pub validator_page_limit: u32,
}

impl Args {
    /// Process settings. Fails only when no API URL was given.
    pub fn settings(&self) -> Result<Settings> {
        let Some(api) = non_empty(&self.api) else {
            bail!("the node REST API URL is required (positional API or EXPORTER_API)");
        };

        Ok(Settings {
            chain: non_empty(&self.chain),
            project_name: non_empty(&self.project_name),
            friendly_name: non_empty(&self.friendly_name),
            network_type: non_empty(&self.network_type),
            api: api.trim_end_matches('/').to_string(),
            operator_address: non_empty(&self.operator_address),
            wallet_address: non_empty(&self.wallet_address),
            consensus_address: non_empty(&self.consensus_address),
            denom: non_empty(&self.denom),
            symbol: None,
            exponent: self.exponent,
            port: self.port,
        })
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            request_timeout: Duration::from_secs(self.request_timeout_secs.max(1)),
            validator_page_limit: self.validator_page_limit.max(1),
            chain_registry_url: self.chain_registry_url.clone(),
        }
    }

    pub fn refresh_config(&self) -> RefreshConfig {
        RefreshConfig {
            scrape_deadline: Duration::from_secs(self.scrape_deadline_secs.max(1)),
        }
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.listen_host, self.port)
    }
}

/// Empty strings (typically unset environment variables in a unit file)
/// count as absent.
fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
