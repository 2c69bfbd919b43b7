//! helps-api - translation-helps gateway service
//!
//! Aggregates scripture and translation-helps resources from a git-based
//! content host behind a stable multi-format HTTP API with tiered data
//! caching.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use helps_api::services::{DcsClient, MemoryTierCache};
use helps_api::{build_router, endpoints, AppState};
use helps_common::config;

#[derive(Parser, Debug)]
#[command(name = "helps-api", version, about = "Translation-helps gateway")]
struct Args {
    /// Bind port (overrides environment and config file)
    #[arg(long)]
    port: Option<u16>,

    /// Upstream content host base URL
    #[arg(long)]
    dcs_url: Option<String>,

    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!(
        "Starting translation-helps gateway (helps-api) v{}",
        env!("CARGO_PKG_VERSION")
    );

    let args = Args::parse();
    let config = config::resolve(args.port, args.dcs_url.as_deref(), args.config.as_deref())
        .context("Failed to resolve configuration")?;
    info!("Content host: {}", config.dcs_base_url);

    let cache = Arc::new(MemoryTierCache::new());
    let client =
        Arc::new(DcsClient::new(&config, cache).context("Failed to build content client")?);

    // A registry misconfiguration refuses to start
    let state = AppState::new(endpoints::builtin_endpoints(), client)
        .context("Endpoint registry validation failed")?;
    info!("Loaded {} endpoints", state.endpoints.len());

    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("helps-api listening on http://{addr}");
    info!("Health check: http://{addr}/health");

    axum::serve(listener, app).await?;

    Ok(())
}
