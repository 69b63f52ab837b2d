//! Call Cache - instrumented caching server
//!
//! Serves the cache, call replay and page cache over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::runtime::Handle;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use call_cache::api::create_router;
use call_cache::page::PageFetcher;
use call_cache::{
    spawn_cleanup_task, AppState, Config, HttpFetcher, MemoryStore, RedisStore, SharedStore,
};

/// Main entry point for the cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect the store once (Redis if `STORE_URL` is set, memory otherwise)
/// 4. Flush the store if configured
/// 5. Start the background TTL purge task (memory store only)
/// 6. Create Axum router with all endpoints
/// 7. Start HTTP server and handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "call_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Call Cache server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: store={}, page_ttl={}s, port={}, cleanup_interval={}s",
        config.store_url.as_deref().unwrap_or("memory"),
        config.page_ttl,
        config.server_port,
        config.cleanup_interval
    );

    let (store, memory) = match config.store_url.clone() {
        Some(url) => {
            let timeout = Duration::from_secs(config.store_timeout);
            let redis = tokio::task::spawn_blocking(move || RedisStore::connect(&url, timeout))
                .await?
                .context("failed to connect to the store")?;
            (Arc::new(redis) as SharedStore, None)
        }
        None => {
            let memory = Arc::new(MemoryStore::new());
            (memory.clone() as SharedStore, Some(memory))
        }
    };

    if config.flush_on_start {
        let flush = store.clone();
        tokio::task::spawn_blocking(move || flush.flushdb())
            .await?
            .context("failed to flush the store")?;
        info!("Store flushed");
    }

    let fetcher: PageFetcher = Arc::new(HttpFetcher::new(
        Duration::from_secs(config.fetch_timeout),
        Handle::current(),
    )?);
    let state = AppState::new(store, fetcher, config.page_ttl);

    let cleanup_handle = memory.map(|memory| spawn_cleanup_task(memory, config.cleanup_interval));

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the purge task and allows graceful shutdown.
async fn shutdown_signal(cleanup_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
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

    if let Some(handle) = cleanup_handle {
        handle.abort();
        warn!("Purge task aborted");
    }
}
