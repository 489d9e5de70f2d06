//! Serve command handler (WebSocket gateway).

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{info, warn};

use premiumbot::gateway::{
    build_router, serve, spawn_limiter_sweeper, AppState, FixedWindowRateLimiter,
};

use super::common::{chat_settings, create_gateway, load_config};

/// How often expired rate-limit windows are dropped.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Start the chat gateway and run until Ctrl+C.
pub(crate) async fn cmd_serve(
    config_path: Option<&Path>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(host) = host {
        config.gateway.host = host;
    }
    if let Some(port) = port {
        config.gateway.port = port;
    }

    let gateway = Arc::new(create_gateway(&config)?);
    let limiter = Arc::new(FixedWindowRateLimiter::new(
        config.gateway.rate_limit,
        Duration::from_secs(config.gateway.rate_window_secs),
    ));
    let sweeper = spawn_limiter_sweeper(Arc::clone(&limiter), SWEEP_INTERVAL);

    let state = Arc::new(AppState::new(gateway, limiter, chat_settings(&config)));
    let router = build_router(state, &config.gateway.allowed_origins)
        .with_context(|| "Invalid gateway configuration")?;

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    println!("PremiumBot gateway listening on ws://{}/chat", listener.local_addr()?);
    println!("Press Ctrl+C to stop.");
    info!(
        rate_limit = config.gateway.rate_limit,
        window_secs = config.gateway.rate_window_secs,
        "Connection rate limiting configured"
    );

    serve(listener, router, shutdown_signal()).await?;

    sweeper.abort();
    println!("Shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C; shut down by killing the process");
        std::future::pending::<()>().await;
    }
}
