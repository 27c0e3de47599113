use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::error;

use validator_metrics::RestSource;

use crate::state::SharedState;

/// `GET /metrics`
///
/// Refreshes every gauge from the node and returns the Prometheus text
/// exposition. Metrics that could not be fetched this cycle are absent
/// from the body; the scrape itself only fails if rendering fails.
pub async fn metrics<S>(State(state): State<SharedState<S>>) -> Response
where
    S: RestSource + 'static,
{
    let content_type = state.refresher.content_type();
    match state.refresher.clone().scrape().await {
        Ok(body) => ([(header::CONTENT_TYPE, content_type)], body).into_response(),
        Err(e) => {
            error!(error = %e, "scrape failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use validator_metrics::{
        ChainClient, ClientConfig, ClientError, MetricRefresher, MetricsRegistry, RefreshConfig,
        Settings,
    };

    use super::*;
    use crate::routes::router;
    use crate::state::AppState;

    /// Node that only knows its latest block and staking params.
    struct StubNode;

    #[async_trait]
    impl RestSource for StubNode {
        async fn get_json(&self, path: &str) -> Result<Value, ClientError> {
            match path {
                "/cosmos/base/tendermint/v1beta1/blocks/latest" => Ok(json!({
                    "block": {"header": {"height": "5", "time": "2024-01-01T00:00:00Z"}}
                })),
                "/cosmos/staking/v1beta1/params" => Ok(json!({
                    "params": {"max_validators": 100}
                })),
                _ => Err(ClientError::Status {
                    url: path.to_string(),
                    status: 404,
                    body: "not found".to_string(),
                }),
            }
        }
    }

    fn app() -> axum::Router {
        let settings = Settings {
            chain: Some("testnet-1".to_string()),
            api: "http://stub".to_string(),
            port: 9100,
            ..Settings::default()
        };
        let registry = MetricsRegistry::new(settings.default_labels()).expect("registry");
        let refresher = MetricRefresher::new(
            ChainClient::new(StubNode, &ClientConfig::default()),
            registry,
            settings,
            RefreshConfig::default(),
        );
        router(Arc::new(AppState {
            refresher: Arc::new(refresher),
        }))
    }

    #[tokio::test]
    async fn metrics_returns_text_exposition() {
        let response = app()
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("text/plain"), "{content_type}");

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(
            text.lines().any(|l| l.starts_with("chain_max_validators{")
                && l.contains(r#"chain="testnet-1""#)
                && l.ends_with(" 100")),
            "{text}"
        );
        assert!(text.lines().any(|l| l.starts_with("chain_latest_block_height{")));
        // Metrics needing unset addresses are left out.
        assert!(!text.contains("validator_wallet_balance_filtered{"));
    }

    #[tokio::test]
    async fn other_routes_are_not_served() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app()
            .oneshot(Request::post("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
