//! fbswarm-sa (Swarm Analysis) - feedback scoring and priority ranking service
//!
//! Configuration comes from a bootstrap TOML file (see `fbswarm_common::config`)
//! with command-line overrides. A missing config file is not an error.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use fbswarm_common::config::{
    default_config_path, load_toml_config, resolve_config_path, write_toml_config, CONFIG_ENV_VAR,
};
use fbswarm_common::db::init_database;
use fbswarm_sa::ranking::RankingStore;
use fbswarm_sa::swarm::{JitterSource, RandomJitter, SwarmRunner};
use fbswarm_sa::{build_router, AppState};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for fbswarm-sa
#[derive(Parser, Debug)]
#[command(name = "fbswarm-sa")]
#[command(about = "Swarm consensus scoring and priority ranking for feedback")]
#[command(version)]
struct Args {
    /// Bootstrap TOML config file
    #[arg(short, long, env = "FBSWARM_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "FBSWARM_SA_PORT")]
    port: Option<u16>,

    /// SQLite database file (overrides the config file)
    #[arg(short, long, env = "FBSWARM_DATABASE")]
    database: Option<PathBuf>,

    /// Write the effective configuration to the config file path and exit
    #[arg(long)]
    write_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is loaded before tracing so its log level can seed the filter.
    // clap already folded FBSWARM_CONFIG into args.config.
    let config_path = resolve_config_path(args.config.as_deref(), CONFIG_ENV_VAR);
    let mut config = load_toml_config(config_path.as_deref()).context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    format!(
                        "fbswarm_sa={0},fbswarm_common={0},tower_http=info",
                        config.logging.level
                    )
                    .into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting fbswarm Swarm Analysis (fbswarm-sa) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config_path {
        Some(path) => info!("Config file: {}", path.display()),
        None => info!("No config file found, using defaults"),
    }

    if let Some(database) = args.database {
        config.database_path = database;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    if args.write_config {
        let target = config_path
            .or_else(default_config_path)
            .context("No config directory available on this platform")?;
        write_toml_config(&config, &target)
            .with_context(|| format!("Failed to write {}", target.display()))?;
        info!("Wrote configuration to {}", target.display());
        return Ok(());
    }

    let db_path = config.database_path.clone();
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    info!("✓ Database ready");

    let jitter: Box<dyn JitterSource + Send> = match config.scoring.seed {
        Some(seed) => {
            warn!(seed, "Scoring jitter is seeded; agent scores are reproducible");
            Box::new(RandomJitter::seeded(seed))
        }
        None => Box::new(RandomJitter::from_entropy()),
    };

    let store = RankingStore::new(
        pool.clone(),
        config.ranking.rescore_policy,
        config.ranking.max_top_limit,
    );
    info!(
        policy = ?store.policy(),
        max_top_limit = store.max_top_limit(),
        "Priority ranking configured"
    );

    let runner = SwarmRunner::new(pool.clone(), store, jitter);
    let app = build_router(AppState::new(pool, runner));

    let port = config.port;
    let addr: SocketAddr = format!("{}:{}", config.bind_address, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.bind_address, port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("fbswarm-sa listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
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
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
