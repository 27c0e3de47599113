//! Validator metrics exporter binary.
//!
//! Serves `GET /metrics` on the configured port. Every scrape refreshes all
//! gauges from the node's REST API before answering, so the exporter holds
//! no background loop and no cache.

mod config;
mod routes;
mod state;

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};

use validator_metrics::{
    ChainClient, ClientConfig, HttpSource, MetricRefresher, MetricsRegistry, Settings, chain_metadata,
};

use config::Args;
use state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "exporter=info,validator_metrics=info".to_string()),
        )
        .init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        error!("fatal error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let mut settings = args.settings()?;
    let client_cfg = args.client_config();
    let refresh_cfg = args.refresh_config();

    // ---------------------------
    // Denomination
    // ---------------------------

    if let Some(project) = settings.project_name.clone() {
        resolve_denomination(&mut settings, &project, &client_cfg).await;
    }
    info!(
        denom = settings.denom.as_deref().unwrap_or("-"),
        exponent = settings.exponent(),
        "denomination resolved"
    );

    // ---------------------------
    // Node connectivity
    // ---------------------------

    let source = HttpSource::new(settings.api.clone(), client_cfg.request_timeout)
        .context("failed to build REST client")?;
    let client = ChainClient::new(source, &client_cfg);

    match client.latest_block().await {
        Ok(block) => info!(api = %settings.api, height = block.height, "connected to node"),
        Err(e) if e.is_unrecoverable() => {
            bail!("node REST API at {} is unreachable: {e}", settings.api);
        }
        Err(e) => warn!(api = %settings.api, error = %e, "connectivity check failed, continuing"),
    }

    // ---------------------------
    // Metrics + HTTP
    // ---------------------------

    let registry = MetricsRegistry::new(settings.default_labels())
        .context("failed to initialise metrics registry")?;
    let refresher = Arc::new(MetricRefresher::new(client, registry, settings, refresh_cfg));
    let app = routes::router(Arc::new(AppState { refresher }));

    let addr = args.listen_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("exporter listening on http://{addr}/metrics");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    Ok(())
}

/// Fills denom, symbol and exponent from the chain registry where the
/// command line left them unset. A failed lookup is not fatal.
async fn resolve_denomination(
    settings: &mut Settings,
    project: &str,
    client_cfg: &ClientConfig,
) {
    let registry = match HttpSource::new(client_cfg.chain_registry_url.as_str(), client_cfg.request_timeout) {
        Ok(registry) => registry,
        Err(e) => {
            warn!(error = %e, "failed to build chain registry client");
            return;
        }
    };

    match chain_metadata(&registry, project).await {
        Ok(meta) => {
            info!(
                project,
                denom = meta.denom.as_deref().unwrap_or("-"),
                decimals = ?meta.decimals,
                "chain registry metadata loaded"
            );
            settings.merge_chain_metadata(meta);
        }
        Err(e) => warn!(project, error = %e, "chain registry lookup failed"),
    }
}

/// Waits for Ctrl-C and returns, used for graceful shutdown.
async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    info!("shutdown signal received");
}
