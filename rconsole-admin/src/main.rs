//! Admin console entry point: load config, initialize logging, serve.

use std::net::SocketAddr;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rconsole_admin::config::{AdminConfig, LoggingSettings};
use rconsole_admin::{build_state, http};

fn init_tracing(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_env("RCONSOLE_LOG")
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    match logging.format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "rconsole.toml".to_string());
    let config = AdminConfig::load(&config_path)?;
    init_tracing(&config.logging);

    if config.servers.is_empty() {
        tracing::warn!("no servers configured; every lookup will fail");
    }

    let state = build_state(&config);
    let router = http::router(state);

    let addr: SocketAddr = format!("{}:{}", config.listen.addr, config.listen.port)
        .parse()
        .context("invalid listen address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "admin console listening");

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}
