//! FetchSubmissionsHandler - Collated submission listing and detail view.
//!
//! Fetches the caller's scoped attendance and offering rows (capped),
//! collates them on their service event key, then applies search, sort
//! and paging for display. Detail lookups query the key's service event
//! directly, so they are not bounded by the row cap.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::domain::foundation::DateWindow;
use crate::domain::hierarchy::{Hierarchy, ServiceType};
use crate::domain::scope::{LocationOverride, UserScope};
use crate::domain::submission::{
    collate, CollatedListing, CollatedRecord, CollationKey, ListingLabels, ListingPage,
    ListingQuery, SubmissionDetail, SubmissionQuery,
};
use crate::ports::{CenterFilter, Clock, ClusterFilter};

use super::{DashboardError, FetchScope, ScopedReader};

/// Query for one page of the collated submission table.
#[derive(Debug, Clone)]
pub struct FetchSubmissionsQuery {
    pub user: UserScope,
    pub window: DateWindow,
    pub location: Option<LocationOverride>,
    pub listing: ListingQuery,
}

impl FetchSubmissionsQuery {
    pub fn new(user: UserScope) -> Self {
        Self {
            user,
            window: DateWindow::All,
            location: None,
            listing: ListingQuery::default(),
        }
    }
}

pub type FetchSubmissionsResult = ListingPage;

/// Collated records plus the reference data needed to label them.
struct Collated {
    records: Vec<CollatedRecord>,
    hierarchy: Hierarchy,
    service_types: Vec<ServiceType>,
}

pub struct FetchSubmissionsHandler {
    reader: ScopedReader,
    clock: Arc<dyn Clock>,
    row_cap: u32,
}

impl FetchSubmissionsHandler {
    pub fn new(reader: ScopedReader, clock: Arc<dyn Clock>, row_cap: u32) -> Self {
        Self {
            reader,
            clock,
            row_cap,
        }
    }

    #[tracing::instrument(skip_all, fields(role = %query.user.role, window = %query.window))]
    pub async fn handle(
        &self,
        query: FetchSubmissionsQuery,
    ) -> Result<FetchSubmissionsResult, DashboardError> {
        query.listing.validate()?;
        let collated = self.collated(&query).await?;
        let listing = CollatedListing::new(
            &collated.records,
            ListingLabels::new(&collated.hierarchy, &collated.service_types),
        );
        Ok(listing.page(&query.listing)?)
    }

    /// Detail view of the collated record whose key is `raw_key`.
    ///
    /// Only records inside the caller's scope and window can be found.
    /// Malformed keys are reported as not found.
    #[tracing::instrument(skip_all, fields(role = %query.user.role, key = %raw_key))]
    pub async fn detail(
        &self,
        query: FetchSubmissionsQuery,
        raw_key: &str,
    ) -> Result<SubmissionDetail, DashboardError> {
        let not_found = || DashboardError::NotFound(raw_key.to_string());
        let key: CollationKey = raw_key.parse().map_err(|_| not_found())?;

        let today = self.clock.today();
        let resolved = self.reader.resolve(&query.user).await?;
        let filter = self
            .reader
            .location_filter(&resolved, query.location.as_ref())
            .await?;
        let lookup = SubmissionQuery::scoped(resolved.user.role, filter, query.window, today)
            .for_key(&key)
            .ok_or_else(not_found)?;

        let store = self.reader.store();
        let (records, service_types) = tokio::try_join!(
            self.reader.fetch_query(&lookup),
            async { store.service_types().await.map_err(DashboardError::from) }
        )?;

        let records = collate(&records.attendance, &records.offerings);
        let record = records.iter().find(|r| r.key == key).ok_or_else(not_found)?;
        let hierarchy = self.label_hierarchy(std::slice::from_ref(record)).await?;
        let listing = CollatedListing::new(
            std::slice::from_ref(record),
            ListingLabels::new(&hierarchy, &service_types),
        );
        Ok(listing.detail(record))
    }

    async fn collated(&self, query: &FetchSubmissionsQuery) -> Result<Collated, DashboardError> {
        let today = self.clock.today();
        let resolved = self.reader.resolve(&query.user).await?;
        let params = FetchScope {
            window: query.window,
            location: query.location.as_ref(),
            today,
            limit: Some(self.row_cap),
        };

        let store = self.reader.store();
        let (records, service_types) = tokio::try_join!(
            self.reader.fetch_scoped(&resolved, params),
            async { store.service_types().await.map_err(DashboardError::from) }
        )?;

        let records = collate(&records.attendance, &records.offerings);
        let hierarchy = self.label_hierarchy(&records).await?;
        Ok(Collated {
            records,
            hierarchy,
            service_types,
        })
    }

    /// Loads the names of every cluster and center the records mention.
    async fn label_hierarchy(
        &self,
        records: &[CollatedRecord],
    ) -> Result<Hierarchy, DashboardError> {
        let cluster_ids: BTreeSet<_> =
            records.iter().filter_map(CollatedRecord::cluster_id).collect();
        let center_ids: BTreeSet<_> =
            records.iter().filter_map(CollatedRecord::center_id).collect();
        let store = self.reader.store();

        let clusters = async {
            if cluster_ids.is_empty() {
                return Ok(Vec::new());
            }
            store.clusters(&ClusterFilter::Ids(cluster_ids.clone())).await
        };
        let centers = async {
            if center_ids.is_empty() {
                return Ok(Vec::new());
            }
            store.centers(&CenterFilter::Ids(center_ids.clone())).await
        };
        let (clusters, centers) = tokio::try_join!(clusters, centers)?;
        Ok(Hierarchy::new(Vec::new(), clusters, centers))
    }
}
