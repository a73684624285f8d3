//! PAstaLink bot service: HTTP entry point for chat transports.
//!
//! Loads the catalog once, wires the classifier tiers and serves
//! `POST /api/v1/messages` until Ctrl-C.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use pl_bot::config::BotConfig;
use pl_bot::pipeline::build_classifier;
use pl_bot::routes::build_router;
use pl_bot::state::AppState;
use pl_catalog::{FileCatalogSource, load_index};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "pastalink-bot starting");

    let config_path = BotConfig::resolve_path(std::env::args().nth(1));
    let config = BotConfig::from_file(&config_path)?;
    tracing::info!(
        config = %config_path,
        catalog = %config.catalog_path,
        fallback_language = %config.fallback_language,
        min_confidence = config.min_confidence,
        "config loaded"
    );

    let catalog = load_index(&FileCatalogSource::new(&config.catalog_path))
        .await
        .with_context(|| format!("loading catalog {}", config.catalog_path))?;
    let catalog = Arc::new(catalog);

    let classifier =
        build_classifier(&config, &catalog).context("building intent classifier")?;
    let state = AppState::build(&config, catalog, classifier);
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("pastalink-bot stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
