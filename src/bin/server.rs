//! Dockline HTTP Server Binary
//!
//! Main entry point for the dock queue REST API server. It opens the store
//! from the snapshot directory, wires the store to the sync bus, sets up the
//! HTTP router and starts serving requests.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin dockline-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `DATA_DIR`: Snapshot directory (default: ./data)
//! - `ROSTER_FILE`: Optional TOML bay roster replacing the built-in one
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use dockline::bus::{spawn_forwarder, SyncBus};
use dockline::config::ServerConfig;
use dockline::http::{create_router, AppState};
use dockline::store::snapshot::FileSnapshotStore;
use dockline::store::DockStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting Dockline HTTP Server");

    let config = ServerConfig::from_env();
    let roster = config.roster()?;
    let snapshots = Arc::new(FileSnapshotStore::open(&config.data_dir)?);
    info!(dir = %snapshots.dir().display(), "snapshot directory ready");

    let bus = SyncBus::new();
    let store = Arc::new(DockStore::open(snapshots, bus.clone(), roster));

    // Apply peer broadcasts for the lifetime of the process.
    spawn_forwarder(Arc::clone(&store), bus.subscribe());

    let state = AppState::new(store);
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
