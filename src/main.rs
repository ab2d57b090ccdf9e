//! Handshake Relayer - cross-chain path registry and signing authorities
//!
//! Loads the configured paths and relayer keys, reports them, and serves
//! metrics for the status checks and signatures performed in this process.

use anyhow::Result;
use tokio::signal;
use tracing::{error, info, warn};

use handshake_relayer::config::Settings;
use handshake_relayer::metrics::MetricsServer;
use handshake_relayer::tx::Authority;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    init_logging();

    info!("Starting Handshake Relayer v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let settings = Settings::load()?;
    info!(
        "Loaded configuration for {} chains",
        settings.enabled_chains().len()
    );

    let paths = settings.registry()?;
    info!("Loaded {} paths", paths.len());
    for (name, path) in paths.iter() {
        info!("Path {}:\n{}", name, path);
    }

    // Signing authorities for every chain with a key
    let mut signers = 0;
    for (name, chain) in settings.enabled_chains() {
        match chain.authority(settings.relayer.default_gas_limit)? {
            Some(authority) => {
                signers += 1;
                info!(
                    "Chain {} ({}): relayer address {:?}, gas limit {}",
                    name,
                    chain.chain_id,
                    authority.address(),
                    authority.gas_limit()
                );
            }
            None => warn!("Chain {} ({}) is read-only", name, chain.chain_id),
        }
    }
    info!("{} signing authorities ready", signers);

    if !settings.metrics.enabled {
        info!("Metrics disabled, nothing left to serve");
        return Ok(());
    }

    let server = MetricsServer::new(settings.metrics.port);
    let metrics_handle = tokio::spawn(async move {
        if let Err(e) = server.run().await {
            error!("Metrics server error: {}", e);
        }
    });
    info!("Metrics: http://0.0.0.0:{}/metrics", settings.metrics.port);

    // Wait for shutdown signal
    shutdown_signal().await;

    info!("Shutdown signal received, stopping...");
    metrics_handle.abort();

    info!("Handshake Relayer stopped");
    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,handshake_relayer=debug,hyper=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
