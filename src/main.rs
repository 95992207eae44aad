//! Peercache node
//!
//! Runs one node of a peercache fleet serving a demo group backed by an
//! in-memory "slow database".

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use peercache::http::{create_api_router, create_peer_router, ApiState, PeerState};
use peercache::{Config, GetterFn, Group, GroupRegistry, HttpPool};

/// Main entry point for a peercache node.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the demo group in a fresh registry
/// 4. Build the peer pool and register it with the group
/// 5. Optionally start the front-end API server
/// 6. Serve peer requests until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "peercache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: self_addr={}, peers={:?}, cache_bytes={}, replicas={}",
        config.self_addr, config.peers, config.cache_bytes, config.replicas
    );

    let registry = GroupRegistry::new();
    let group = create_group(&registry, &config);

    let pool = Arc::new(HttpPool::with_options(
        config.self_addr.clone(),
        peercache::http::DEFAULT_BASE_PATH,
        config.replicas,
    ));
    pool.set(&config.peers);
    group.register_peers(pool.clone())?;

    let api_handle = match &config.api_addr {
        Some(api_addr) => {
            let listener = tokio::net::TcpListener::bind(api_addr.as_str())
                .await
                .with_context(|| format!("binding api server to {api_addr}"))?;
            info!("Front-end API listening on http://{}", api_addr);
            let app = create_api_router(ApiState::new(group.clone()));
            Some(tokio::spawn(async move {
                if let Err(err) = axum::serve(listener, app).await {
                    warn!("API server stopped: {}", err);
                }
            }))
        }
        None => None,
    };

    let app = create_peer_router(PeerState::new(registry), pool.base_path());
    let listener = tokio::net::TcpListener::bind(config.listen_addr())
        .await
        .with_context(|| format!("binding peer server to {}", config.listen_addr()))?;
    info!("peercache is running at {}", config.self_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(api_handle))
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Registers the demo group, loading from a fixed score table.
fn create_group(registry: &GroupRegistry, config: &Config) -> Arc<Group> {
    let db: HashMap<&'static str, &'static str> =
        HashMap::from([("Tom", "630"), ("Jack", "589"), ("Sam", "567")]);

    registry.new_group(
        config.group_name.clone(),
        config.cache_bytes,
        Arc::new(GetterFn(move |key: &str| {
            info!("[SlowDB] search key {}", key);
            db.get(key)
                .map(|v| v.as_bytes().to_vec())
                .ok_or_else(|| anyhow::anyhow!("{key} not exist"))
        })),
    )
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the API server and allows graceful shutdown.
async fn shutdown_signal(api_handle: Option<tokio::task::JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if let Some(handle) = api_handle {
        handle.abort();
        warn!("API server aborted");
    }
}
