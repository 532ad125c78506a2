//! In-memory snapshot of the Region -> Cluster -> Center tree.

use std::collections::{BTreeSet, HashMap};

use crate::domain::foundation::{CenterId, ClusterId, RegionId};

use super::{Center, Cluster, Region};

/// Read-only view over a fetched slice of the hierarchy.
///
/// The snapshot does not need to be complete: the scope resolver only
/// loads the part of the tree a role can reach. Lookups for nodes that
/// were not loaded behave as if the node does not exist.
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    regions: HashMap<RegionId, Region>,
    clusters: HashMap<ClusterId, Cluster>,
    centers: HashMap<CenterId, Center>,
}

impl Hierarchy {
    pub fn new(regions: Vec<Region>, clusters: Vec<Cluster>, centers: Vec<Center>) -> Self {
        Self {
            regions: regions.into_iter().map(|r| (r.id, r)).collect(),
            clusters: clusters.into_iter().map(|c| (c.id, c)).collect(),
            centers: centers.into_iter().map(|c| (c.id, c)).collect(),
        }
    }

    pub fn region(&self, id: &RegionId) -> Option<&Region> {
        self.regions.get(id)
    }

    pub fn cluster(&self, id: &ClusterId) -> Option<&Cluster> {
        self.clusters.get(id)
    }

    pub fn center(&self, id: &CenterId) -> Option<&Center> {
        self.centers.get(id)
    }

    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.values()
    }

    pub fn clusters(&self) -> impl Iterator<Item = &Cluster> {
        self.clusters.values()
    }

    pub fn centers(&self) -> impl Iterator<Item = &Center> {
        self.centers.values()
    }

    /// Clusters whose parent is `region_id`. Ungrouped clusters never match.
    pub fn clusters_in_region(&self, region_id: &RegionId) -> BTreeSet<ClusterId> {
        self.clusters
            .values()
            .filter(|c| c.region_id.as_ref() == Some(region_id))
            .map(|c| c.id)
            .collect()
    }

    /// Centers whose parent is `cluster_id`.
    pub fn centers_in_cluster(&self, cluster_id: &ClusterId) -> BTreeSet<CenterId> {
        self.centers
            .values()
            .filter(|c| &c.cluster_id == cluster_id)
            .map(|c| c.id)
            .collect()
    }

    /// Centers whose parent is any of `cluster_ids`.
    pub fn centers_in_clusters(&self, cluster_ids: &BTreeSet<ClusterId>) -> BTreeSet<CenterId> {
        self.centers
            .values()
            .filter(|c| cluster_ids.contains(&c.cluster_id))
            .map(|c| c.id)
            .collect()
    }

    /// Every cluster and center below a region.
    pub fn descendants_of_region(
        &self,
        region_id: &RegionId,
    ) -> (BTreeSet<ClusterId>, BTreeSet<CenterId>) {
        let clusters = self.clusters_in_region(region_id);
        let centers = self.centers_in_clusters(&clusters);
        (clusters, centers)
    }

    pub fn cluster_of(&self, center_id: &CenterId) -> Option<ClusterId> {
        self.centers.get(center_id).map(|c| c.cluster_id)
    }

    pub fn region_of_cluster(&self, cluster_id: &ClusterId) -> Option<RegionId> {
        self.clusters.get(cluster_id).and_then(|c| c.region_id)
    }

    /// Cluster and (if grouped) region above a center.
    pub fn ancestors_of_center(
        &self,
        center_id: &CenterId,
    ) -> Option<(ClusterId, Option<RegionId>)> {
        let cluster_id = self.cluster_of(center_id)?;
        Some((cluster_id, self.region_of_cluster(&cluster_id)))
    }

    pub fn region_name(&self, id: &RegionId) -> Option<&str> {
        self.regions.get(id).map(|r| r.name.as_str())
    }

    pub fn cluster_name(&self, id: &ClusterId) -> Option<&str> {
        self.clusters.get(id).map(|c| c.name.as_str())
    }

    pub fn center_name(&self, id: &CenterId) -> Option<&str> {
        self.centers.get(id).map(|c| c.name.as_str())
    }
}
