use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use catalog_filter::api::{create_router, AppState, Limits};
use catalog_filter::config::Config;
use catalog_filter::db::{create_redis_client, Cache, RedisSnapshotStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let mut state = AppState::new().with_limits(Limits {
        max_page_items: config.max_page_items,
        max_feed_items: config.max_feed_items,
    });

    // Snapshot persistence is optional; sessions stay in memory without it
    let mut writer = None;
    if let Some(redis_url) = &config.redis_url {
        let client = create_redis_client(redis_url).context("invalid REDIS_URL")?;
        let (cache, handle) = Cache::new(client)
            .await
            .context("failed to connect to Redis")?;
        state = state.with_snapshots(Arc::new(RedisSnapshotStore::new(
            cache,
            config.filter_state_ttl,
        )));
        writer = Some(handle);
        tracing::info!(ttl = config.filter_state_ttl, "Filter snapshots persisted to Redis");
    } else {
        tracing::info!("REDIS_URL not set, filter snapshots kept in memory only");
    }

    // Idle sessions leave memory on the same clock their snapshots expire on
    let reaper = state.spawn_session_reaper(Duration::from_secs(config.filter_state_ttl));

    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;
    tracing::info!(address = %address, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    reaper.abort();
    if let Some(handle) = writer {
        handle.shutdown().await;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
