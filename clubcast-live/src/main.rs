//! Clubcast Live Engine - Main entry point
//!
//! Wires together configuration, the SQLite catalog, the live engine, the
//! scheduler and expiry timers, and the HTTP/SSE server.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clubcast_live::config::{Config, Overrides};
use clubcast_live::{api, db, scheduler, LiveEngine};

/// Command-line arguments for clubcast-live
#[derive(Parser, Debug)]
#[command(name = "clubcast-live")]
#[command(about = "Live queue and playback scheduling service for Clubcast")]
#[command(version)]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long, env = "CLUBCAST_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "CLUBCAST_PORT")]
    port: Option<u16>,

    /// SQLite database path
    #[arg(short, long, env = "CLUBCAST_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Base URL transcoded media is published under
    #[arg(long, env = "CLUBCAST_MEDIA_BASE_URL")]
    media_base_url: Option<String>,

    /// Shared secret for player agent endpoints
    #[arg(long, env = "CLUBCAST_AGENT_SECRET")]
    agent_secret: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clubcast_live=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = Config::resolve(
        args.config.as_deref(),
        Overrides {
            port: args.port,
            db_path: args.db_path,
            media_base_url: args.media_base_url,
            agent_secret: args.agent_secret,
        },
    )
    .context("Failed to resolve configuration")?;

    info!("Starting Clubcast Live Engine on port {}", config.port);
    info!("Database: {}", config.db_path.display());

    let pool = db::init::init_database(&config.db_path)
        .await
        .context("Failed to initialize database")?;
    info!("Database initialized");

    let engine = Arc::new(LiveEngine::new(pool, config));

    // Background drivers: schedule reconciliation and song expiry
    tokio::spawn(scheduler::run_reconciler(engine.clone()));
    tokio::spawn(scheduler::run_expiry(engine.clone()));

    api::run(engine).await.context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}
