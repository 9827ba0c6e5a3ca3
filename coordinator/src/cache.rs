use crate::{
    connectivity::{
        ConnectivityState,
        CycleFailure,
    },
    metrics::Snapshot,
};
use chrono::{
    DateTime,
    Utc,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;

/// What readers see: the last published snapshot and how much to trust it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CachedResult {
    pub snapshot: Option<Arc<Snapshot>>,
    /// The last cycle did not produce `snapshot`.
    pub is_stale: bool,
    pub connectivity: ConnectivityState,
    /// Last write to the cache.
    pub updated_at: Option<DateTime<Utc>>,
    pub last_failure: Option<CycleFailure>,
}

impl Default for CachedResult {
    fn default() -> Self {
        Self {
            snapshot: None,
            is_stale: true,
            connectivity: ConnectivityState::Down,
            updated_at: None,
            last_failure: None,
        }
    }
}

/// Single-writer holder of the latest [`CachedResult`].
#[derive(Debug)]
pub struct StateCache {
    tx: watch::Sender<CachedResult>,
}

impl Default for StateCache {
    fn default() -> Self {
        Self::new()
    }
}

impl StateCache {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(CachedResult::default());
        Self { tx }
    }

    /// Replaces the cached value with a fresh snapshot.
    pub fn publish(&self, snapshot: Snapshot, connectivity: ConnectivityState) {
        self.tx.send_replace(CachedResult {
            snapshot: Some(Arc::new(snapshot)),
            is_stale: false,
            connectivity,
            updated_at: Some(Utc::now()),
            last_failure: None,
        });
    }

    /// Keeps the snapshot but flags it as outdated.
    pub fn mark_stale(&self, failure: CycleFailure) {
        self.tx.send_modify(|cached| {
            cached.is_stale = true;
            cached.connectivity = ConnectivityState::Down;
            cached.updated_at = Some(Utc::now());
            cached.last_failure = Some(failure);
        });
    }

    pub fn read(&self) -> CachedResult {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> CacheReader {
        CacheReader { rx: self.tx.subscribe() }
    }
}

/// Read-only handle on a [`StateCache`].
#[derive(Debug, Clone)]
pub struct CacheReader {
    rx: watch::Receiver<CachedResult>,
}

impl CacheReader {
    pub fn read(&self) -> CachedResult {
        self.rx.borrow().clone()
    }

    /// Waits for the next write. `false` once the cache is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}
