use axum::{Router, routing::get};

use validator_metrics::RestSource;

use crate::state::SharedState;

pub mod metrics;

/// The exporter serves a single route.
pub fn router<S>(state: SharedState<S>) -> Router
where
    S: RestSource + 'static,
{
    Router::new()
        .route("/metrics", get(metrics::metrics::<S>))
        .with_state(state)
}
