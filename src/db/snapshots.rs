use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{ContentContext, FilterState},
};

use super::redis::{Cache, CacheKey};

/// Persistence for filter state snapshots
///
/// Lets a session be resumed with the facet values it last had. Writes are
/// fire-and-forget; a lost write only means the session resumes with older
/// values.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Every stored snapshot of a session, one per context at most
    async fn load(&self, session: Uuid) -> AppResult<Vec<FilterState>>;

    /// Stores one context snapshot
    fn save(&self, session: Uuid, state: &FilterState);

    /// Forgets every snapshot of a session
    async fn remove(&self, session: Uuid) -> AppResult<()>;
}

/// Snapshot store backed by the Redis [`Cache`]
pub struct RedisSnapshotStore {
    cache: Cache,
    ttl: u64,
}

impl RedisSnapshotStore {
    pub fn new(cache: Cache, ttl: u64) -> Self {
        Self { cache, ttl }
    }

    fn key(session: Uuid, context: ContentContext) -> CacheKey {
        CacheKey::FilterState { session, context }
    }
}

#[async_trait]
impl SnapshotStore for RedisSnapshotStore {
    async fn load(&self, session: Uuid) -> AppResult<Vec<FilterState>> {
        let mut snapshots = Vec::new();
        for context in ContentContext::ALL {
            let stored: Option<FilterState> =
                self.cache.get_from_cache(&Self::key(session, context)).await?;
            // A snapshot filed under the wrong context is ignored
            if let Some(state) = stored.filter(|s| s.context == context) {
                snapshots.push(state);
            }
        }

        tracing::debug!(session_id = %session, restored = snapshots.len(), "Loaded filter snapshots");
        Ok(snapshots)
    }

    fn save(&self, session: Uuid, state: &FilterState) {
        self.cache
            .set_in_background(&Self::key(session, state.context), state, self.ttl);
    }

    async fn remove(&self, session: Uuid) -> AppResult<()> {
        let keys: Vec<CacheKey> = ContentContext::ALL
            .into_iter()
            .map(|context| Self::key(session, context))
            .collect();
        self.cache.delete(&keys).await
    }
}
