use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CenterId, ClusterId, RegionId, ServiceTypeId};

/// Top-level grouping of clusters. Regions have no parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub id: RegionId,
    pub name: String,
}

/// A zone of centers.
///
/// `region_id` is `None` for legacy clusters that were never grouped
/// into a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub id: ClusterId,
    pub name: String,
    pub region_id: Option<RegionId>,
}

/// A single worship center. Always belongs to exactly one cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Center {
    pub id: CenterId,
    pub name: String,
    pub cluster_id: ClusterId,
}

/// Kind of service a submission was recorded for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceType {
    pub id: ServiceTypeId,
    pub name: String,
}

impl Region {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: RegionId::new(),
            name: name.into(),
        }
    }
}

impl Cluster {
    pub fn new(name: impl Into<String>, region_id: Option<RegionId>) -> Self {
        Self {
            id: ClusterId::new(),
            name: name.into(),
            region_id,
        }
    }
}

impl Center {
    pub fn new(name: impl Into<String>, cluster_id: ClusterId) -> Self {
        Self {
            id: CenterId::new(),
            name: name.into(),
            cluster_id,
        }
    }
}

impl ServiceType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ServiceTypeId::new(),
            name: name.into(),
        }
    }
}
