use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::db::SnapshotStore;
use crate::error::AppResult;
use crate::models::FilterState;
use crate::services::BrowseSession;

/// Input size limits
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub max_page_items: usize,
    pub max_feed_items: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_page_items: 100,
            max_feed_items: 5_000,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<RwLock<AppStateInner>>,
    pub snapshots: Option<Arc<dyn SnapshotStore>>,
    pub limits: Limits,
}

/// Inner state that can be modified
pub struct AppStateInner {
    pub sessions: HashMap<Uuid, BrowseSession>,
}

impl AppStateInner {
    /// Looks up a live session and marks it as used
    pub fn session_mut(&mut self, id: &Uuid) -> Option<&mut BrowseSession> {
        let session = self.sessions.get_mut(id)?;
        session.touch();
        Some(session)
    }
}

/// Upper bound on the pause between idle-session sweeps
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// Creates an empty, memory-only application state
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(AppStateInner {
                sessions: HashMap::new(),
            })),
            snapshots: None,
            limits: Limits::default(),
        }
    }

    pub fn with_snapshots(mut self, snapshots: Arc<dyn SnapshotStore>) -> Self {
        self.snapshots = Some(snapshots);
        self
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Opens a session, restoring persisted filter state when resuming
    ///
    /// Resuming an id that is still live keeps its state and refreshes its
    /// last access.
    pub async fn open_session(&self, resume: Option<Uuid>) -> AppResult<Uuid> {
        let id = resume.unwrap_or_else(Uuid::new_v4);

        if self.inner.write().await.session_mut(&id).is_some() {
            return Ok(id);
        }

        let mut session = BrowseSession::new(id, self.limits.max_feed_items);
        if let (Some(_), Some(store)) = (resume, &self.snapshots) {
            let restored = store.load(id).await?;
            tracing::info!(session_id = %id, restored = restored.len(), "Resuming session");
            for state in restored {
                session.context_mut(state.context).restore(state);
            }
        }

        self.inner
            .write()
            .await
            .sessions
            .entry(id)
            .or_insert(session);
        Ok(id)
    }

    /// Writes a context snapshot through the configured store, if any
    pub fn persist(&self, session: Uuid, state: &FilterState) {
        if let Some(store) = &self.snapshots {
            store.save(session, state);
        }
    }

    /// Drops sessions untouched for at least `max_idle`
    ///
    /// Persisted snapshots are left to expire on their own TTL, so an evicted
    /// session can still be resumed while they last.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut inner = self.inner.write().await;
        let before = inner.sessions.len();
        inner
            .sessions
            .retain(|_, session| session.idle_for() < max_idle);
        let evicted = before - inner.sessions.len();

        if evicted > 0 {
            tracing::info!(evicted, live = inner.sessions.len(), "Evicted idle sessions");
        }
        evicted
    }

    /// Spawns a task that periodically evicts sessions idle for `max_idle`
    pub fn spawn_session_reaper(&self, max_idle: Duration) -> JoinHandle<()> {
        let state = self.clone();
        let period = max_idle.clamp(Duration::from_secs(1), MAX_SWEEP_INTERVAL);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                state.evict_idle(max_idle).await;
            }
        })
    }

    pub async fn close_session(&self, id: Uuid) -> AppResult<bool> {
        let removed = self.inner.write().await.sessions.remove(&id).is_some();
        if let Some(store) = &self.snapshots {
            store.remove(id).await?;
        }
        Ok(removed)
    }
}
