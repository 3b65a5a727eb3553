//! contribs-api server entry point.
//!
//! Loads configuration from `CONTRIBS_*` environment variables (and an
//! optional TOML file named by `CONTRIBS_CONFIG_FILE`), then serves the
//! contributions API over HTTP. Logs are JSON on stderr, filtered by
//! `RUST_LOG` (default: info).

use anyhow::Result;
use contribs_core::AppConfig;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod router;
mod service;
mod state;

#[cfg(test)]
mod testing;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let state = state::AppState::from_config(&config).await?;
    let app = router::create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("contribs-api listening on http://{addr}");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!("contribs-api stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
