use anyhow::{Context, Result};
use bluelink_control::config::DEFAULT_CONFIG_PATH;
use bluelink_control::{
    create_router, logging, AppState, BluelinkFactory, Config, ManagerProvider, Transport,
};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

/// HTTP control service for Hyundai Bluelink / Kia UVO vehicles
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Options file; BLUELINK_* environment variables are used when it is absent
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Override the configured listen port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let args = Args::parse();

    let mut cfg = match Config::load(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("{}. Please configure the add-on.", e);
            std::process::exit(1);
        }
    };
    if let Some(port) = args.port {
        cfg.port = port;
    }
    let cfg = cfg;

    info!("Bluelink Control v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded for {}", cfg.username);

    let transport = Transport::new().context("Failed to create HTTP transport")?;
    let factory = Arc::new(BluelinkFactory::new(transport));
    let provider = Arc::new(ManagerProvider::from_config(&cfg, factory));

    // Connect eagerly; a failure here is retried on the first request
    info!("Starting up HTTP server...");
    if provider.get().await.is_err() {
        warn!("Vehicle manager unavailable at startup, will retry on first request");
    }

    let app = create_router(AppState::new(provider, &cfg.vehicle_id));

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Shutting down HTTP server...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to setup SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C shutdown signal"),
        _ = terminate => info!("Received SIGTERM shutdown signal"),
    }
}
