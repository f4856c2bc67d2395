//! JogGPS Coach - AI coaching relay server
//!
//! # Usage
//!
//! ```bash
//! # Run against a local Redis
//! OPENROUTER_API_KEY=sk-... cargo run --release
//!
//! # Run without Redis (process-local cache)
//! cargo run --release -- --memory-cache
//!
//! # Explicit config file and address
//! ./joggps-coach --config ./coach_config.toml --addr 127.0.0.1:8080
//! ```
//!
//! # Environment Variables
//!
//! - `OPENROUTER_API_KEY`: upstream key (without it every tick gets a fallback message)
//! - `REDIS_URL` or `REDIS_HOST`/`REDIS_PORT`/`REDIS_PASSWORD`: cache location
//! - `COACH_CONFIG`: path to a TOML config file
//! - `COACH_CORS_ORIGINS`: comma-separated allowed browser origins
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use joggps_coach::api::{create_app, AppState};
use joggps_coach::config::{mask_credentials, CacheBackend, CoachConfig};
use joggps_coach::{cache, OpenRouterClient};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "joggps-coach")]
#[command(about = "JogGPS AI coaching relay")]
#[command(version)]
struct CliArgs {
    /// Override the server address (default: "0.0.0.0:3000")
    #[arg(short, long, env = "COACH_SERVER_ADDR")]
    addr: Option<String>,

    /// Path to a coach_config.toml (skips the COACH_CONFIG / ./coach_config.toml search)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Use the in-memory cache instead of Redis
    #[arg(long)]
    memory_cache: bool,
}

/// Config from the explicit path or the standard search, then CLI overrides.
fn load_config(args: &CliArgs) -> Result<CoachConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let mut config = CoachConfig::load_from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            config.apply_env_overrides();
            config
        }
        None => CoachConfig::load(),
    };

    if let Some(addr) = &args.addr {
        config.server.addr.clone_from(addr);
    }
    if args.memory_cache {
        config.cache.backend = CacheBackend::Memory;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();
    let config = load_config(&args)?;

    info!(
        addr = %config.server.addr,
        cache = ?config.cache.backend,
        redis = %mask_credentials(&config.cache.redis_url),
        model = %config.upstream.default_model,
        "JogGPS Coach starting"
    );

    let store = cache::from_config(&config.cache).context("Failed to create cache store")?;
    let invoker =
        Arc::new(OpenRouterClient::new(&config.upstream).context("Failed to build HTTP client")?);
    let state = AppState::new(&config, Arc::clone(&store), invoker);
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&config.server.addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.addr))?;
    info!(addr = %config.server.addr, "HTTP server listening");

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            cancel_token.cancelled().await;
        })
        .await
        .context("HTTP server error")?;

    store.close().await;
    info!("JogGPS Coach shutdown complete");
    Ok(())
}
