//! # AAS Delegate Bridge
//!
//! Receives delegated Operation invocations from an AAS server and writes the
//! carried value to a property in the backing submodel repository.

use aas_delegate_bridge::server::shutdown_signal;
use aas_delegate_bridge::{serve, Bridge, BridgeConfig};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting AAS delegate bridge"
    );

    let config = BridgeConfig::from_env()?;
    let bridge = Arc::new(Bridge::from_config(&config)?);

    tracing::info!(
        target_url = %bridge.target(),
        argument_aliases = ?config.normalizer.argument_aliases,
        field_aliases = ?config.normalizer.field_aliases,
        timeout = ?config.repository.timeout,
        "Bridge initialized"
    );

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    serve(
        listener,
        bridge,
        config.server.max_body_bytes,
        shutdown_signal(),
    )
    .await?;

    Ok(())
}
