use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::AppError;
use crate::error::AppResult;
use crate::models::ContentContext;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Filter state snapshot of one session context
    FilterState {
        session: Uuid,
        context: ContentContext,
    },
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::FilterState { session, context } => {
                write!(f, "filters:{}:{}", session, context)
            }
        }
    }
}

/// Opens a Redis client for filter state snapshots
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Queued snapshot write
struct CacheWriteMessage {
    key: String,
    value: String,
    ttl: u64,
}

/// Redis-backed snapshot cache with a background writer
///
/// Reads go straight to Redis over a shared, auto-reconnecting connection.
/// Writes are queued on a channel and applied by a spawned task so request
/// handlers never wait on Redis.
#[derive(Clone)]
pub struct Cache {
    conn: ConnectionManager,
    write_tx: mpsc::UnboundedSender<CacheWriteMessage>,
}

/// Handle for flushing and stopping the background writer
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl CacheWriterHandle {
    /// Signals the writer to flush queued snapshots and stop
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tracing::info!("Snapshot writer shutdown signal sent");
    }
}

impl Cache {
    /// Connects, then spawns the writer task
    pub async fn new(redis_client: Client) -> AppResult<(Self, CacheWriterHandle)> {
        let conn = ConnectionManager::new(redis_client).await?;
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let writer_conn = conn.clone();
        tokio::spawn(async move {
            Self::writer_task(writer_conn, write_rx, shutdown_rx).await;
        });

        let cache = Self { conn, write_tx };

        Ok((cache, CacheWriterHandle { shutdown_tx }))
    }

    async fn writer_task(
        mut conn: ConnectionManager,
        mut write_rx: mpsc::UnboundedReceiver<CacheWriteMessage>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!("Snapshot writer started");
        let mut failed_writes = 0u64;

        loop {
            tokio::select! {
                Some(msg) = write_rx.recv() => {
                    if let Err(e) = Self::write_to_redis(&mut conn, msg).await {
                        failed_writes += 1;
                        tracing::error!(error = %e, failed_writes, "Failed to write filter snapshot");
                    }
                }
                _ = shutdown_rx.recv() => {
                    tracing::info!("Snapshot writer shutting down, flushing queued writes");

                    // Only drain what is already queued; senders may still be alive
                    while let Ok(msg) = write_rx.try_recv() {
                        if let Err(e) = Self::write_to_redis(&mut conn, msg).await {
                            tracing::error!(error = %e, "Failed to flush filter snapshot during shutdown");
                        }
                    }

                    tracing::info!("Snapshot writer stopped");
                    break;
                }
            }
        }
    }

    async fn write_to_redis(conn: &mut ConnectionManager, msg: CacheWriteMessage) -> AppResult<()> {
        let _: () = conn.set_ex(msg.key, msg.value, msg.ttl).await?;
        Ok(())
    }

    /// Reads and deserializes the value stored under `key`, if any
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let mut conn = self.conn.clone();
        let cached: Option<String> = conn.get(key.to_string()).await?;

        match cached {
            Some(json) => {
                let data = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Snapshot deserialization error: {}", e))
                })?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    /// Queues a write without waiting for Redis
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, key = %key, "Snapshot serialization error");
                return;
            }
        };

        let msg = CacheWriteMessage {
            key: key.to_string(),
            value: json,
            ttl,
        };

        if let Err(e) = self.write_tx.send(msg) {
            tracing::error!(error = %e, "Failed to queue filter snapshot write");
        }
    }

    /// Deletes keys immediately
    pub async fn delete(&self, keys: &[CacheKey]) -> AppResult<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let names: Vec<String> = keys.iter().map(ToString::to_string).collect();
        let mut conn = self.conn.clone();
        let _: () = conn.del(names).await?;
        Ok(())
    }
}
