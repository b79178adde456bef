//! Price Fetcher
//!
//! A small JSON API serving cryptocurrency prices, derived market statistics
//! and coin metadata from in-memory lookup tables.
//!
//! # Architecture
//!
//! - **Domain**: response entities, the `PriceFetcher` trait and the lookup tables
//! - **Application**: the base fetch service plus metrics and logging decorators
//! - **Infrastructure**: the typed HTTP client mirroring the endpoints
//! - **API**: HTTP handlers, routing and middleware
//!
//! # Configuration
//!
//! - `--listenaddr` / `LISTEN_ADDR`: listen address (default `:3000`)
//! - `--config` / `CONFIG_PATH`: optional YAML file (default `config.yaml`)
//! - `RUST_LOG`: logging level (default: info)
//! - `LOG_FORMAT`: `json` for JSON logs, anything else for text
//!
//! # Quick Start
//!
//! ```bash
//! cargo run --release -- --listenaddr :3000
//!
//! curl "http://localhost:3000/price?ticker=BTC"
//! curl -X POST -d '{"tickers":["BTC","ETH"]}' http://localhost:3000/batch
//! ```

use anyhow::Context;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use price_fetcher::api::{create_router, AppState};
use price_fetcher::application::build_fetcher;
use price_fetcher::config::{resolve_listen_addr, Cli, Config};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let env_filter = EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()));

    if log_format.eq_ignore_ascii_case("json") {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    let config = Config::load(&cli.config)?;
    let market_data = Arc::new(config.market_data().context("Failed to load market data")?);
    tracing::info!(
        "Loaded {} priced tickers{}",
        market_data.ticker_count(),
        config
            .data_path
            .as_ref()
            .map(|p| format!(" from {}", p.display()))
            .unwrap_or_default()
    );

    let prometheus = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    let fetcher = build_fetcher(market_data.clone(), config.latency);
    let state = AppState::new(fetcher, market_data).with_metrics(prometheus);
    let app = create_router(state, &config.server.allowed_origins);

    let addr = resolve_listen_addr(&cli.listen_addr);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to address {}", addr))?;
    tracing::info!("price-fetcher listening on {}", addr);
    tracing::info!("endpoints: /price /market /info /tickers /batch");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error during operation")?;

    Ok(())
}

/// Wait for SIGTERM or SIGINT (Ctrl+C) to initiate graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        },
    }
}
