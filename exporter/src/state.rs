//! Shared application state.

use std::sync::Arc;

use validator_metrics::MetricRefresher;

/// State handed to request handlers via Axum's `State` extractor.
pub struct AppState<S> {
    /// Runs one refresh cycle per scrape.
    pub refresher: Arc<MetricRefresher<S>>,
}

/// Thread-safe alias for `AppState`.
pub type SharedState<S> = Arc<AppState<S>>;
