//! gkam-intake - Gatekeepers Album Maker intake service
//!
//! Serves the intake wizard over HTTP: chat transports post typed events
//! per session key and relay the returned prompts, albums and summary.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gkam_common::config::{ConfigResolver, TomlConfig};
use gkam_common::events::EventBus;
use gkam_intake::services::{
    DisabledLookup, FollowerLookup, IntakeService, ScrapingFollowerLookup,
};
use gkam_intake::store::InMemorySessionStore;
use gkam_intake::workflow::MachineContext;
use gkam_intake::AppState;

/// Command-line arguments for gkam-intake
#[derive(Parser, Debug)]
#[command(name = "gkam-intake")]
#[command(about = "Intake wizard service for the Gatekeepers Album Maker")]
#[command(version)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on (overrides server.bind_addr)
    #[arg(short, long, env = "GKAM_BIND_ADDR")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = ConfigResolver::new("gkam-intake").resolve(args.config.as_deref());
    let config = TomlConfig::load_or_default(config_path.as_deref())
        .context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting gkam-intake v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE"),
    );
    match &config_path {
        Some(path) => info!("Config: {}", path.display()),
        None => info!("Config: compiled defaults"),
    }

    let lookup: Arc<dyn FollowerLookup> = if config.enrichment.enabled {
        Arc::new(
            ScrapingFollowerLookup::new(&config.enrichment)
                .context("Failed to build HTTP client for follower lookup")?,
        )
    } else {
        info!("Follower enrichment disabled");
        Arc::new(DisabledLookup)
    };

    let event_bus = EventBus::new(config.events.capacity);
    let service = IntakeService::new(
        Arc::new(InMemorySessionStore::new()),
        lookup,
        MachineContext::from_config(&config),
        event_bus.clone(),
    );
    let app = gkam_intake::build_router(AppState::new(service, event_bus));

    let bind_addr = args.bind.unwrap_or(config.server.bind_addr);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    info!("Listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
