//! GetDashboardSnapshotHandler - Summary and trends from a single scoped fetch.
//!
//! Optionally served through a read-through [`SnapshotCache`].

use std::sync::Arc;

use crate::domain::dashboard::DashboardSnapshot;
use crate::ports::{Clock, SnapshotCache, SnapshotKey};

use super::{DashboardError, DashboardQuery, FetchScope, ScopedReader};

pub type GetDashboardSnapshotResult = DashboardSnapshot;

pub struct GetDashboardSnapshotHandler {
    reader: ScopedReader,
    clock: Arc<dyn Clock>,
    bucket_cap: usize,
    cache: Option<Arc<dyn SnapshotCache>>,
}

impl GetDashboardSnapshotHandler {
    pub fn new(reader: ScopedReader, clock: Arc<dyn Clock>, bucket_cap: usize) -> Self {
        Self {
            reader,
            clock,
            bucket_cap,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn SnapshotCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    #[tracing::instrument(skip_all, fields(role = %query.user.role, window = %query.window))]
    pub async fn handle(
        &self,
        query: DashboardQuery,
    ) -> Result<GetDashboardSnapshotResult, DashboardError> {
        let today = self.clock.today();
        let key = SnapshotKey {
            user: query.user.clone(),
            window: query.window,
            location: query.location,
            today,
        };

        if let Some(cache) = &self.cache {
            if let Some(snapshot) = cache.get(&key).await {
                tracing::trace!("Snapshot cache hit");
                return Ok(snapshot);
            }
        }

        let resolved = self.reader.resolve(&query.user).await?;
        let params = FetchScope {
            window: query.window,
            location: query.location.as_ref(),
            today,
            limit: None,
        };
        let (records, counts) = tokio::try_join!(
            self.reader.fetch_scoped(&resolved, params),
            self.reader.organization_counts()
        )?;

        let snapshot = DashboardSnapshot::build(
            &records.attendance,
            &records.offerings,
            counts,
            query.window,
            today,
            self.bucket_cap,
        );

        if let Some(cache) = &self.cache {
            cache.put(key, snapshot.clone()).await;
        }
        Ok(snapshot)
    }
}
