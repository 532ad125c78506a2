//! In-memory snapshot cache with a fixed time-to-live and entry cap.
//!
//! Single-process only; entries are not shared across servers.

use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use std::time::Duration;

use crate::domain::dashboard::DashboardSnapshot;
use crate::ports::{SnapshotCache, SnapshotKey};

#[derive(Clone)]
pub struct InMemorySnapshotCache {
    entries: MokaCache<SnapshotKey, DashboardSnapshot>,
}

impl InMemorySnapshotCache {
    /// Holds at most `max_capacity` snapshots, each for at most `ttl`.
    pub fn new(ttl: Duration, max_capacity: u64) -> Self {
        let entries = MokaCache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();
        Self { entries }
    }

    /// Approximate entry count; exact after [`Self::sync`].
    pub fn len(&self) -> u64 {
        self.entries.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Applies pending evictions and expirations.
    pub async fn sync(&self) {
        self.entries.run_pending_tasks().await;
    }
}

impl std::fmt::Debug for InMemorySnapshotCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySnapshotCache")
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}

#[async_trait]
impl SnapshotCache for InMemorySnapshotCache {
    async fn get(&self, key: &SnapshotKey) -> Option<DashboardSnapshot> {
        self.entries.get(key).await
    }

    async fn put(&self, key: SnapshotKey, snapshot: DashboardSnapshot) {
        self.entries.insert(key, snapshot).await;
    }
}
