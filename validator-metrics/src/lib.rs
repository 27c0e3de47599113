//! Validator metrics library crate.
//!
//! This crate reads a Cosmos SDK validator's state from a node's REST API
//! and publishes it as Prometheus gauges:
//!
//! - configuration resolved once at startup (`config`),
//! - typed values shared by the other modules (`types`),
//! - the chain data client and its transport seam (`client`),
//! - the gauge set and Prometheus registry (`metrics`),
//! - the scrape-driven refresh cycle (`refresh`).
//!
//! The `exporter` binary composes these into an HTTP service.

pub mod client;
pub mod config;
pub mod metrics;
pub mod refresh;
pub mod types;

pub use config::{ChainMetadata, ClientConfig, RefreshConfig, Settings};

pub use client::{ChainClient, ClientError, Denomination, HttpSource, RestSource, chain_metadata};
pub use metrics::{Gauge, GaugeSample, MetricsRegistry, RegistryError};
pub use refresh::{CycleReport, MetricRefresher, Scrape, ScrapeError};
