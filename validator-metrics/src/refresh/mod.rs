//! Scrape-time refresh of the metric registry.

mod orchestrator;

pub use orchestrator::{CycleReport, MetricRefresher, Scrape, ScrapeError};
