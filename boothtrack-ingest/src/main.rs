//! boothtrack-ingest - Scan ingestion and session derivation service
//!
//! Receives proximity scans over HTTP, derives dwell-time sessions, stores
//! them in SQLite, and notifies connected dashboards over SSE.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use boothtrack_common::config::{self, ConfigOverrides};
use boothtrack_common::db::{init_database, SessionStore};
use boothtrack_common::events::EventBus;
use boothtrack_common::time::TimeNormalizer;
use boothtrack_ingest::{build_router, AppState};

/// Command-line arguments for boothtrack-ingest
///
/// Every option falls back through environment variable, config file, and
/// compiled default (see boothtrack_common::config).
#[derive(Parser, Debug)]
#[command(name = "boothtrack-ingest")]
#[command(about = "Scan ingestion service for BoothTrack")]
#[command(version)]
struct Args {
    /// Bind host
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// SQLite database path
    #[arg(long)]
    database: Option<PathBuf>,

    /// Fixed timezone for persisted timestamps (IANA name)
    #[arg(long)]
    timezone: Option<String>,

    /// Booth id stamped on scans that omit one
    #[arg(long)]
    booth_id: Option<i64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!(
        "Starting BoothTrack ingestion service v{}",
        env!("CARGO_PKG_VERSION")
    );

    let args = Args::parse();
    let config = config::resolve(ConfigOverrides {
        db_path: args.database,
        bind_host: args.host,
        port: args.port,
        timezone: args.timezone,
        default_booth_id: args.booth_id,
    })
    .context("Failed to resolve configuration")?;

    info!("Database path: {}", config.db_path.display());
    info!("Fixed timezone: {}", config.timezone);

    let pool = init_database(&config.db_path)
        .await
        .context("Failed to initialize database")?;
    info!("✓ Connected to database");

    let store = SessionStore::new(pool);
    let events = Arc::new(EventBus::new(256));
    let normalizer = TimeNormalizer::new(config.timezone);

    let state = AppState::new(
        store.clone(),
        normalizer,
        events,
        config.default_booth_id,
    );
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind((config.bind_host.as_str(), config.port))
        .await
        .with_context(|| format!("Failed to bind to {}:{}", config.bind_host, config.port))?;
    let addr = listener.local_addr()?;
    info!("boothtrack-ingest listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Let in-flight writes finish before dropping the pool
    store.close().await;
    info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}
