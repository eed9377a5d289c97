//! connexd - ConnexView Server Daemon
//!
//! Serves the execution-log monitoring API over an in-memory store.
//!
//! Usage:
//!   connexd [config.toml]
//!
//! Without a config file every setting takes its default; `CONNEX_HOST`,
//! `CONNEX_PORT` and `CONNEX_ENV` override either.

mod config;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use connex_api::{create_router, AppState};
use connex_core::{LogFilter, LogStore};
use connex_store::{seed, MemoryStore, SampleGenerator};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::DaemonConfig;

/// Parsed command-line arguments
struct Args {
    /// Server config file (TOML)
    config_path: Option<PathBuf>,
}

fn parse_args() -> Args {
    let mut result = Args { config_path: None };

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            arg if !arg.starts_with('-') => {
                // Positional argument = config file
                result.config_path = Some(PathBuf::from(arg));
            }
            _ => {
                tracing::warn!("Unknown argument: {}", arg);
            }
        }
    }

    result
}

fn print_help() {
    eprintln!(
        r#"connexd - ConnexView Server Daemon

Usage: connexd [config.toml]

Options:
  -h, --help    Print this help message

Environment:
  CONNEX_HOST   Listen host (default 0.0.0.0)
  CONNEX_PORT   Listen port (default 8000)
  CONNEX_ENV    development | production
  RUST_LOG      Log filter (default connexd=info,connex_api=info,...)

Examples:
  # Run with defaults
  connexd

  # Run with config file
  connexd config/connexd.toml
"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "connexd=info,connex_api=info,connex_store=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting connexd (ConnexView Server Daemon)");

    let args = parse_args();
    if let Some(ref path) = args.config_path {
        tracing::info!("Loading config from: {}", path.display());
    }
    let config = DaemonConfig::load(args.config_path.as_deref())?;
    let addr = config.listen_addr()?;
    tracing::info!(environment = config.api.environment.as_str(), "Configuration loaded");

    // The store must answer before we accept traffic
    let store = Arc::new(MemoryStore::new());
    store
        .ping()
        .await
        .context("Record store did not answer the startup probe")?;

    if config.server.seed_on_empty {
        seed_if_empty(store.as_ref(), &config).await;
    }

    let state = AppState::new(store, config.api.clone());
    let sweeper = state.config.rate_limit.enabled.then(|| {
        state
            .rate_limiter
            .spawn_sweeper(state.config.rate_limit.sweep_interval())
    });

    let app = create_router(state);

    tracing::info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    if let Some(handle) = sweeper {
        handle.abort();
    }
    tracing::info!("connexd stopped");
    Ok(())
}

/// Best-effort sample data so a fresh instance has something to show
async fn seed_if_empty(store: &dyn LogStore, config: &DaemonConfig) {
    match store.count(&LogFilter::all()).await {
        Ok(0) => {
            let mut generator = SampleGenerator::new();
            match seed::reseed(
                store,
                &mut generator,
                config.api.seed.record_count,
                config.api.seed.batch_size,
            )
            .await
            {
                Ok(report) => tracing::info!(
                    records = report.records_inserted,
                    batches = report.batches,
                    "Seeded empty store"
                ),
                Err(e) => tracing::warn!(error = %e, "Seeding empty store failed"),
            }
        }
        Ok(count) => tracing::info!(count, "Store already holds records, skipping seed"),
        Err(e) => tracing::warn!(error = %e, "Could not count records, skipping seed"),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
