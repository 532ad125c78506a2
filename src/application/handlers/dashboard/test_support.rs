//! Shared mock store and hierarchy fixture for handler tests.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::domain::foundation::{CenterId, ClusterId, RegionId, ServiceTypeId};
use crate::domain::hierarchy::{Center, Cluster, Region, ServiceType};
use crate::domain::submission::{AttendanceSubmission, OfferingSubmission, SubmissionQuery};
use crate::ports::{CenterFilter, ClusterFilter, RecordStore, StoreError};

/// North (K1: C1, C2; K2: C3), South (K3: C4), and an ungrouped legacy
/// cluster with one center.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub regions: Vec<Region>,
    pub clusters: Vec<Cluster>,
    pub centers: Vec<Center>,
    pub service_types: Vec<ServiceType>,
    pub north: RegionId,
    pub south: RegionId,
    pub k1: ClusterId,
    pub k2: ClusterId,
    pub k3: ClusterId,
    pub legacy: ClusterId,
    pub c1: CenterId,
    pub c2: CenterId,
    pub c3: CenterId,
    pub c4: CenterId,
    pub legacy_center: CenterId,
    pub sunday: ServiceTypeId,
}

impl Fixture {
    pub fn new() -> Self {
        let north = Region::new("North");
        let south = Region::new("South");
        let k1 = Cluster::new("Riverside", Some(north.id));
        let k2 = Cluster::new("Lakeside", Some(north.id));
        let k3 = Cluster::new("Harbor", Some(south.id));
        let legacy = Cluster::new("Old Town", None);
        let c1 = Center::new("Hilltop", k1.id);
        let c2 = Center::new("Valley", k1.id);
        let c3 = Center::new("Shore", k2.id);
        let c4 = Center::new("Dock", k3.id);
        let legacy_center = Center::new("Chapel", legacy.id);
        let sunday = ServiceType::new("Sunday Service");

        Self {
            north: north.id,
            south: south.id,
            k1: k1.id,
            k2: k2.id,
            k3: k3.id,
            legacy: legacy.id,
            c1: c1.id,
            c2: c2.id,
            c3: c3.id,
            c4: c4.id,
            legacy_center: legacy_center.id,
            sunday: sunday.id,
            regions: vec![north, south],
            clusters: vec![k1, k2, k3, legacy],
            centers: vec![c1, c2, c3, c4, legacy_center],
            service_types: vec![sunday, ServiceType::new("Midweek Prayer")],
        }
    }
}

/// Mock store recording which collections were read.
pub struct MockRecordStore {
    fixture: Fixture,
    attendance: Vec<AttendanceSubmission>,
    offerings: Vec<OfferingSubmission>,
    fail_on: Option<&'static str>,
    calls: Mutex<Vec<&'static str>>,
}

impl MockRecordStore {
    pub fn new(fixture: Fixture) -> Self {
        Self {
            fixture,
            attendance: Vec::new(),
            offerings: Vec::new(),
            fail_on: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_attendance(mut self, records: Vec<AttendanceSubmission>) -> Self {
        self.attendance = records;
        self
    }

    pub fn with_offerings(mut self, records: Vec<OfferingSubmission>) -> Self {
        self.offerings = records;
        self
    }

    pub fn failing_on(mut self, collection: &'static str) -> Self {
        self.fail_on = Some(collection);
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, collection: &'static str) -> Result<(), StoreError> {
        self.calls.lock().unwrap().push(collection);
        if self.fail_on == Some(collection) {
            return Err(StoreError::Unavailable(format!("{} read failed", collection)));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MockRecordStore {
    async fn regions(&self) -> Result<Vec<Region>, StoreError> {
        self.record("regions")?;
        Ok(self.fixture.regions.clone())
    }

    async fn clusters(&self, filter: &ClusterFilter) -> Result<Vec<Cluster>, StoreError> {
        self.record("clusters")?;
        Ok(self
            .fixture
            .clusters
            .iter()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect())
    }

    async fn centers(&self, filter: &CenterFilter) -> Result<Vec<Center>, StoreError> {
        self.record("centers")?;
        Ok(self
            .fixture
            .centers
            .iter()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect())
    }

    async fn service_types(&self) -> Result<Vec<ServiceType>, StoreError> {
        self.record("service_types")?;
        Ok(self.fixture.service_types.clone())
    }

    async fn count_clusters(&self) -> Result<u64, StoreError> {
        self.record("count_clusters")?;
        Ok(self.fixture.clusters.len() as u64)
    }

    async fn count_centers(&self) -> Result<u64, StoreError> {
        self.record("count_centers")?;
        Ok(self.fixture.centers.len() as u64)
    }

    async fn attendance(
        &self,
        query: &SubmissionQuery,
    ) -> Result<Vec<AttendanceSubmission>, StoreError> {
        self.record("attendance")?;
        Ok(query.apply(&self.attendance))
    }

    async fn offerings(
        &self,
        query: &SubmissionQuery,
    ) -> Result<Vec<OfferingSubmission>, StoreError> {
        self.record("offerings")?;
        Ok(query.apply(&self.offerings))
    }
}
