//! Scope resolution and scoped fetching shared by every dashboard query.

use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::domain::dashboard::OrganizationCounts;
use crate::domain::foundation::{DateWindow, RegionId};
use crate::domain::hierarchy::Hierarchy;
use crate::domain::scope::{AccessScope, LocationFilter, LocationOverride, Role, UserScope};
use crate::domain::submission::{AttendanceSubmission, OfferingSubmission, SubmissionQuery};
use crate::ports::{CenterFilter, ClusterFilter, RecordStore};

use super::DashboardError;

/// A caller's grant together with the hierarchy slice it was resolved from.
#[derive(Debug, Clone)]
pub struct ResolvedScope {
    pub user: UserScope,
    pub scope: AccessScope,
    pub hierarchy: Hierarchy,
}

/// Attendance and offering records visible to one caller.
#[derive(Debug, Clone, Default)]
pub struct ScopedRecords {
    pub attendance: Vec<AttendanceSubmission>,
    pub offerings: Vec<OfferingSubmission>,
}

impl ScopedRecords {
    pub fn is_empty(&self) -> bool {
        self.attendance.is_empty() && self.offerings.is_empty()
    }
}

/// Parameters of one scoped fetch.
#[derive(Debug, Clone, Copy)]
pub struct FetchScope<'a> {
    pub window: DateWindow,
    pub location: Option<&'a LocationOverride>,
    pub today: NaiveDate,
    /// Row cap per collection; `None` fetches every matching row.
    pub limit: Option<u32>,
}

/// Resolves grants and reads the records inside them.
#[derive(Clone)]
pub struct ScopedReader {
    store: Arc<dyn RecordStore>,
}

impl ScopedReader {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Loads only the part of the tree the role can reach, then resolves
    /// the grant against it.
    pub async fn resolve(&self, user: &UserScope) -> Result<ResolvedScope, DashboardError> {
        let hierarchy = match user.role {
            Role::SuperAdmin | Role::CenterRep => {
                user.validate()?;
                Hierarchy::default()
            }
            Role::RegionAdmin => self.load_region(&user.assigned_region()?).await?,
            Role::ClusterAdmin => {
                let cluster_id = user.assigned_cluster()?;
                let centers = self
                    .store
                    .centers(&CenterFilter::InClusters(BTreeSet::from([cluster_id])))
                    .await?;
                Hierarchy::new(Vec::new(), Vec::new(), centers)
            }
        };

        let scope = AccessScope::resolve(user, &hierarchy)?;
        tracing::debug!(
            role = %user.role,
            clusters = scope.cluster_ids.len(),
            centers = scope.center_ids.len(),
            unrestricted = scope.unrestricted,
            "Resolved access scope"
        );
        Ok(ResolvedScope {
            user: user.clone(),
            scope,
            hierarchy,
        })
    }

    /// Location filter for a query, narrowed by `location` when given.
    pub async fn location_filter(
        &self,
        resolved: &ResolvedScope,
        location: Option<&LocationOverride>,
    ) -> Result<LocationFilter, DashboardError> {
        let Some(location) = location else {
            return Ok(LocationFilter::for_grant(resolved.user.role, &resolved.scope));
        };

        resolved.scope.authorize_override(&resolved.user, location)?;

        // Every other role already holds the override's subtree.
        if resolved.user.role == Role::SuperAdmin {
            let subtree = match location {
                LocationOverride::Region(region_id) => self.load_region(region_id).await?,
                LocationOverride::Cluster(cluster_id) => {
                    let centers = self
                        .store
                        .centers(&CenterFilter::InClusters(BTreeSet::from([*cluster_id])))
                        .await?;
                    Hierarchy::new(Vec::new(), Vec::new(), centers)
                }
                LocationOverride::Center(_) => Hierarchy::default(),
            };
            return Ok(LocationFilter::for_override(location, &subtree));
        }
        Ok(LocationFilter::for_override(location, &resolved.hierarchy))
    }

    /// Fetches the caller's attendance and offering records concurrently.
    ///
    /// Fails as a whole if either read fails.
    pub async fn fetch_scoped(
        &self,
        resolved: &ResolvedScope,
        params: FetchScope<'_>,
    ) -> Result<ScopedRecords, DashboardError> {
        let filter = self.location_filter(resolved, params.location).await?;
        let mut query =
            SubmissionQuery::scoped(resolved.user.role, filter, params.window, params.today);
        if let Some(limit) = params.limit {
            query = query.limit(limit);
        }

        let records = self.fetch_query(&query).await?;
        tracing::debug!(
            window = %params.window,
            attendance = records.attendance.len(),
            offerings = records.offerings.len(),
            "Fetched scoped submissions"
        );
        Ok(records)
    }

    /// Runs an already-scoped query against both submission collections.
    pub async fn fetch_query(
        &self,
        query: &SubmissionQuery,
    ) -> Result<ScopedRecords, DashboardError> {
        if query.is_trivially_empty() {
            tracing::debug!("Empty grant, skipping submission reads");
            return Ok(ScopedRecords::default());
        }

        let (attendance, offerings) =
            tokio::try_join!(self.store.attendance(query), self.store.offerings(query))
                .map_err(|e| {
                    tracing::warn!(error = %e, "Scoped submission fetch failed");
                    DashboardError::from(e)
                })?;
        Ok(ScopedRecords {
            attendance,
            offerings,
        })
    }

    /// Organization-wide node counts, independent of any grant.
    pub async fn organization_counts(&self) -> Result<OrganizationCounts, DashboardError> {
        let (clusters, centers) =
            tokio::try_join!(self.store.count_clusters(), self.store.count_centers())?;
        Ok(OrganizationCounts { clusters, centers })
    }

    async fn load_region(&self, region_id: &RegionId) -> Result<Hierarchy, DashboardError> {
        let clusters = self
            .store
            .clusters(&ClusterFilter::InRegion(*region_id))
            .await?;
        let cluster_ids: BTreeSet<_> = clusters.iter().map(|c| c.id).collect();
        let centers = if cluster_ids.is_empty() {
            Vec::new()
        } else {
            self.store.centers(&CenterFilter::InClusters(cluster_ids)).await?
        };
        Ok(Hierarchy::new(Vec::new(), clusters, centers))
    }
}
