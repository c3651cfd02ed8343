//! GameDex UI - Main entry point
//!
//! Web service for the game catalog: JSON API, SSE live subscriptions and
//! the static web UI.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gamedex_common::config::resolve_root_folder;
use gamedex_common::db::{init_database, seed_catalog};
use gamedex_common::events::EventBus;
use gamedex_ui::{api, AppState};

/// Command-line arguments for gamedex-ui
#[derive(Parser, Debug)]
#[command(name = "gamedex-ui")]
#[command(about = "Game catalog and review web service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5780", env = "GAMEDEX_PORT")]
    port: u16,

    /// Root folder holding the database and uploaded images
    #[arg(short, long)]
    root_folder: Option<String>,

    /// Directory holding the static web UI assets
    #[arg(long, default_value = "gamedex-ui/static", env = "GAMEDEX_STATIC_DIR")]
    static_dir: PathBuf,

    /// Seed the catalog with the fixed game roster on startup
    #[arg(long)]
    seed: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gamedex=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), "GAMEDEX_ROOT_FOLDER")
        .context("Failed to resolve root folder")?;

    info!("Starting GameDex UI on port {}", args.port);
    info!("Root folder: {}", root_folder.display());

    let db = init_database(&root_folder.join("gamedex.db"))
        .await
        .context("Failed to initialize database")?;

    let event_bus = EventBus::new(100);

    if args.seed {
        let games = seed_catalog(&db, &event_bus)
            .await
            .context("Failed to seed catalog")?;
        info!("Catalog holds {} games", games);
    }

    let state = AppState::new(db, event_bus, root_folder);
    let app = api::create_router(state, &args.static_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

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
