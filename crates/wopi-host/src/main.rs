//! WOPI Host Binary
//!
//! Runs the WOPI host HTTP server for a single read-only document.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use wopi_core::{CapabilitySigner, SystemClock};
use wopi_host::{
    create_router, AppState, CapabilityStore, CapabilitySweeper, DocumentStore, FilesystemDocuments,
    HostConfig, MemoryCapabilityStore,
};

/// WOPI host issuing time-limited, single-document capabilities
#[derive(Parser, Debug)]
#[command(name = "wopi-host")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to an optional TOML configuration file
    #[arg(short, long, env = "WOPI_HOST_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_file = args.config.as_deref().filter(|p| p.exists());
    let config = HostConfig::load(config_file).context("failed to load configuration")?;

    // Initialize logging
    let log_level = config.log_level.parse().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    if let (Some(path), None) = (&args.config, config_file) {
        warn!(path = %path.display(), "Config file not found, using defaults and environment");
    }

    let signer = match &config.signing_secret {
        Some(secret) => CapabilitySigner::new(secret.as_bytes()),
        None => {
            warn!("No signing_secret configured, generating an ephemeral one");
            CapabilitySigner::new(&rand::random::<[u8; 32]>())
        }
    }
    .with_leeway(config.signature_leeway());

    let documents = FilesystemDocuments::new(config.document_source());
    documents
        .prepare()
        .await
        .context("failed to prepare documents directory")?;
    let documents: Arc<dyn DocumentStore> = Arc::new(documents);

    let store: Arc<dyn CapabilityStore> = Arc::new(MemoryCapabilityStore::new());
    let clock = Arc::new(SystemClock);

    let sweep = CapabilitySweeper::new(store.clone(), clock.clone(), config.sweep_interval()).spawn();

    info!(
        document = %config.document.path.display(),
        file_id = %config.document.file_id,
        ttl_secs = config.token_ttl().num_seconds(),
        signature_leeway_secs = signer.leeway().num_seconds(),
        office_online_url = %config.office_online_url,
        signing_secret_configured = config.signing_secret.is_some(),
        trust_upstream_caller = config.trust_upstream_caller,
        "Starting WOPI host"
    );

    let bind = config.bind.clone();
    let state = Arc::new(AppState::new(config, signer, store, documents, clock));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind to {}", bind))?;

    info!(addr = %bind, "WOPI host listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    sweep.shutdown().await;
    info!("WOPI host stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
