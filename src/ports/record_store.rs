//! Read port over the hierarchy and submission collections.

use async_trait::async_trait;
use std::collections::BTreeSet;

use crate::domain::foundation::{CenterId, ClusterId, RegionId};
use crate::domain::hierarchy::{Center, Cluster, Region, ServiceType};
use crate::domain::submission::{AttendanceSubmission, OfferingSubmission, SubmissionQuery};

/// Read-only access to everything the dashboards aggregate.
///
/// Implementations must apply [`SubmissionQuery`] with exactly the
/// semantics of [`SubmissionQuery::matches`] and [`SubmissionQuery::apply`].
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn regions(&self) -> Result<Vec<Region>, StoreError>;

    async fn clusters(&self, filter: &ClusterFilter) -> Result<Vec<Cluster>, StoreError>;

    async fn centers(&self, filter: &CenterFilter) -> Result<Vec<Center>, StoreError>;

    async fn service_types(&self) -> Result<Vec<ServiceType>, StoreError>;

    /// Organization-wide cluster count.
    async fn count_clusters(&self) -> Result<u64, StoreError>;

    /// Organization-wide center count.
    async fn count_centers(&self) -> Result<u64, StoreError>;

    async fn attendance(
        &self,
        query: &SubmissionQuery,
    ) -> Result<Vec<AttendanceSubmission>, StoreError>;

    async fn offerings(
        &self,
        query: &SubmissionQuery,
    ) -> Result<Vec<OfferingSubmission>, StoreError>;
}

/// Which clusters to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterFilter {
    All,
    /// Clusters whose `region_id` equals the region. Ungrouped clusters never match.
    InRegion(RegionId),
    Ids(BTreeSet<ClusterId>),
}

/// Which centers to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CenterFilter {
    All,
    InClusters(BTreeSet<ClusterId>),
    Ids(BTreeSet<CenterId>),
}

impl ClusterFilter {
    pub fn matches(&self, cluster: &Cluster) -> bool {
        match self {
            ClusterFilter::All => true,
            ClusterFilter::InRegion(region_id) => cluster.region_id.as_ref() == Some(region_id),
            ClusterFilter::Ids(ids) => ids.contains(&cluster.id),
        }
    }

    /// True when the filter can only return an empty list.
    pub fn is_empty(&self) -> bool {
        matches!(self, ClusterFilter::Ids(ids) if ids.is_empty())
    }
}

impl CenterFilter {
    pub fn matches(&self, center: &Center) -> bool {
        match self {
            CenterFilter::All => true,
            CenterFilter::InClusters(clusters) => clusters.contains(&center.cluster_id),
            CenterFilter::Ids(ids) => ids.contains(&center.id),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CenterFilter::All => false,
            CenterFilter::InClusters(clusters) => clusters.is_empty(),
            CenterFilter::Ids(ids) => ids.is_empty(),
        }
    }
}

/// Failures of the underlying record store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Record store unavailable: {0}")]
    Unavailable(String),

    #[error("Record store timed out")]
    Timeout,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Malformed {collection} row: {reason}")]
    MalformedRow {
        collection: &'static str,
        reason: String,
    },
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => StoreError::Timeout,
            sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(err.to_string())
            }
            other => StoreError::Database(other.to_string()),
        }
    }
}
