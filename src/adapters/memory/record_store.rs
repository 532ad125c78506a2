//! In-memory record store for tests and local development.
//!
//! Applies `SubmissionQuery` with the reference semantics the Postgres
//! adapter reproduces in SQL.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::hierarchy::{Center, Cluster, Region, ServiceType};
use crate::domain::submission::{AttendanceSubmission, OfferingSubmission, SubmissionQuery};
use crate::ports::{CenterFilter, ClusterFilter, RecordStore, StoreError};

#[derive(Debug, Default)]
struct Collections {
    regions: Vec<Region>,
    clusters: Vec<Cluster>,
    centers: Vec<Center>,
    service_types: Vec<ServiceType>,
    attendance: Vec<AttendanceSubmission>,
    offerings: Vec<OfferingSubmission>,
}

/// Record store backed by vectors behind a `RwLock`.
///
/// Cheap to clone; clones share the same collections.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordStore {
    data: Arc<RwLock<Collections>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_region(&self, region: Region) {
        self.data.write().await.regions.push(region);
    }

    pub async fn add_cluster(&self, cluster: Cluster) {
        self.data.write().await.clusters.push(cluster);
    }

    pub async fn add_center(&self, center: Center) {
        self.data.write().await.centers.push(center);
    }

    pub async fn add_service_type(&self, service_type: ServiceType) {
        self.data.write().await.service_types.push(service_type);
    }

    /// Stores an attendance row. Rows breaking the level invariant are rejected.
    pub async fn add_attendance(&self, record: AttendanceSubmission) -> Result<(), StoreError> {
        record.header.validate().map_err(|e| StoreError::MalformedRow {
            collection: "attendance",
            reason: e.to_string(),
        })?;
        self.data.write().await.attendance.push(record);
        Ok(())
    }

    pub async fn add_offering(&self, record: OfferingSubmission) -> Result<(), StoreError> {
        record.header.validate().map_err(|e| StoreError::MalformedRow {
            collection: "offerings",
            reason: e.to_string(),
        })?;
        if record.amount_100.is_sign_negative() {
            return Err(StoreError::MalformedRow {
                collection: "offerings",
                reason: format!("negative amount_100 {}", record.amount_100),
            });
        }
        self.data.write().await.offerings.push(record);
        Ok(())
    }

    /// Makes every subsequent read fail until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            tracing::warn!("In-memory record store is marked unavailable");
            return Err(StoreError::Unavailable("store marked unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn regions(&self) -> Result<Vec<Region>, StoreError> {
        self.check_available()?;
        Ok(self.data.read().await.regions.clone())
    }

    async fn clusters(&self, filter: &ClusterFilter) -> Result<Vec<Cluster>, StoreError> {
        self.check_available()?;
        let data = self.data.read().await;
        Ok(data.clusters.iter().filter(|c| filter.matches(c)).cloned().collect())
    }

    async fn centers(&self, filter: &CenterFilter) -> Result<Vec<Center>, StoreError> {
        self.check_available()?;
        let data = self.data.read().await;
        Ok(data.centers.iter().filter(|c| filter.matches(c)).cloned().collect())
    }

    async fn service_types(&self) -> Result<Vec<ServiceType>, StoreError> {
        self.check_available()?;
        Ok(self.data.read().await.service_types.clone())
    }

    async fn count_clusters(&self) -> Result<u64, StoreError> {
        self.check_available()?;
        Ok(self.data.read().await.clusters.len() as u64)
    }

    async fn count_centers(&self) -> Result<u64, StoreError> {
        self.check_available()?;
        Ok(self.data.read().await.centers.len() as u64)
    }

    async fn attendance(
        &self,
        query: &SubmissionQuery,
    ) -> Result<Vec<AttendanceSubmission>, StoreError> {
        self.check_available()?;
        let rows = query.apply(&self.data.read().await.attendance);
        tracing::debug!("attendance query matched {} rows", rows.len());
        Ok(rows)
    }

    async fn offerings(
        &self,
        query: &SubmissionQuery,
    ) -> Result<Vec<OfferingSubmission>, StoreError> {
        self.check_available()?;
        let rows = query.apply(&self.data.read().await.offerings);
        tracing::debug!("offerings query matched {} rows", rows.len());
        Ok(rows)
    }
}
