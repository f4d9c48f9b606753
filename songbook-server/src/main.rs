//! songbook-server - HTTP backend for the chord-sheet songbook
//!
//! Serves the songs directory over a JSON API. `build-index` runs the
//! built-in songs index builder once and exits.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use songbook_common::config::{load_toml_config, resolve_config_path, Config, ConfigOverrides};
use songbook_common::{index, SongStore};
use songbook_server::{build_router, AppState};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for songbook-server
#[derive(Parser, Debug)]
#[command(name = "songbook-server")]
#[command(about = "HTTP backend for a directory of chord-pro songs")]
#[command(version)]
struct Args {
    /// TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Base directory holding the songs directory and flag file
    #[arg(short, long, global = true)]
    base_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server (default)
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Build the songs index once and exit
    BuildIndex {
        /// Output directory (relative to the base directory)
        #[arg(short, long, default_value = "public/data")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (host, port) = match &args.command {
        Some(Commands::Serve { host, port }) => (host.clone(), *port),
        _ => (None, None),
    };

    let config_path = resolve_config_path(args.config.as_deref());
    let toml_config = match &config_path {
        Some(path) => load_toml_config(path).context("Failed to load configuration")?,
        None => None,
    };
    let log_level = toml_config
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|| "info".to_string());

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("songbook_server={0},songbook_common={0},tower_http={0}", log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting songbook-server v{}", env!("CARGO_PKG_VERSION"));
    match (&config_path, toml_config.is_some()) {
        (Some(path), true) => info!("Loaded configuration from {}", path.display()),
        (Some(path), false) => warn!("Config file {} not found, using defaults", path.display()),
        (None, _) => warn!("No config directory available, using defaults"),
    }

    let config = Config::resolve(
        toml_config.unwrap_or_default(),
        ConfigOverrides {
            base_dir: args.base_dir.clone(),
            host,
            port,
        },
    )
    .context("Failed to resolve configuration")?;
    info!("Songs directory: {}", config.songs_dir.display());
    info!("Flag file: {}", config.flags_file.display());

    match args.command {
        Some(Commands::BuildIndex { output }) => build_index_once(&config, output).await,
        _ => serve(config).await,
    }
}

async fn build_index_once(config: &Config, output: PathBuf) -> Result<()> {
    let store = SongStore::new(&config.songs_dir);
    let output_dir = config.base_dir.join(output);

    let count = index::build_index(&store, &config.base_dir, &output_dir)
        .await
        .context("Failed to build songs index")?;

    info!("Built {} song(s)", count);
    Ok(())
}

async fn serve(config: Config) -> Result<()> {
    let state = AppState::from_config(&config);
    if !state.build.is_enabled() {
        info!("Build trigger disabled");
    }

    let app = build_router(state);

    let ip = config
        .host
        .parse::<IpAddr>()
        .with_context(|| format!("Invalid host address {:?}", config.host))?;
    let addr = SocketAddr::new(ip, config.port);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("songbook-server listening on http://{}", addr);

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
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
