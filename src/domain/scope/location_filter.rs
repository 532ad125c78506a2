//! Location filter expressions over submission records.
//!
//! Cluster-level submissions carry only `cluster_id`, center-level ones
//! only `center_id`, so an admin's view needs a disjunction over both
//! columns. The filter is a small tagged union that store adapters
//! translate into their own query language.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::domain::foundation::{CenterId, ClusterId};
use crate::domain::hierarchy::Hierarchy;

use super::{AccessScope, LocationOverride, Role};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LocationFilter {
    /// No location constraint.
    Unrestricted,
    /// `center_id IN centers`.
    ByCenterSet { centers: BTreeSet<CenterId> },
    /// `cluster_id IN clusters`.
    ByClusterSet { clusters: BTreeSet<ClusterId> },
    /// `cluster_id IN clusters OR center_id IN centers`.
    Either {
        centers: BTreeSet<CenterId>,
        clusters: BTreeSet<ClusterId>,
    },
}

impl LocationFilter {
    pub fn centers(centers: impl IntoIterator<Item = CenterId>) -> Self {
        LocationFilter::ByCenterSet {
            centers: centers.into_iter().collect(),
        }
    }

    pub fn clusters(clusters: impl IntoIterator<Item = ClusterId>) -> Self {
        LocationFilter::ByClusterSet {
            clusters: clusters.into_iter().collect(),
        }
    }

    pub fn either(
        centers: impl IntoIterator<Item = CenterId>,
        clusters: impl IntoIterator<Item = ClusterId>,
    ) -> Self {
        LocationFilter::Either {
            centers: centers.into_iter().collect(),
            clusters: clusters.into_iter().collect(),
        }
    }

    /// Filter implied by a caller's grant.
    ///
    /// Center reps are limited to their center; admins see anything
    /// stored against a cluster or a center in their grant.
    pub fn for_grant(role: Role, scope: &AccessScope) -> Self {
        if scope.unrestricted {
            return LocationFilter::Unrestricted;
        }
        match role {
            Role::CenterRep => LocationFilter::centers(scope.center_ids.iter().copied()),
            _ => LocationFilter::either(
                scope.center_ids.iter().copied(),
                scope.cluster_ids.iter().copied(),
            ),
        }
    }

    /// Filter for an override target, built from its descendants.
    ///
    /// `hierarchy` must contain the override's subtree.
    pub fn for_override(location: &LocationOverride, hierarchy: &Hierarchy) -> Self {
        match location {
            LocationOverride::Region(region_id) => {
                let (clusters, centers) = hierarchy.descendants_of_region(region_id);
                LocationFilter::Either { centers, clusters }
            }
            LocationOverride::Cluster(cluster_id) => LocationFilter::Either {
                centers: hierarchy.centers_in_cluster(cluster_id),
                clusters: BTreeSet::from([*cluster_id]),
            },
            LocationOverride::Center(center_id) => LocationFilter::centers([*center_id]),
        }
    }

    /// True when no record can ever match.
    pub fn matches_nothing(&self) -> bool {
        match self {
            LocationFilter::Unrestricted => false,
            LocationFilter::ByCenterSet { centers } => centers.is_empty(),
            LocationFilter::ByClusterSet { clusters } => clusters.is_empty(),
            LocationFilter::Either { centers, clusters } => {
                centers.is_empty() && clusters.is_empty()
            }
        }
    }

    /// Reference semantics for a record's location columns.
    pub fn matches(&self, center_id: Option<&CenterId>, cluster_id: Option<&ClusterId>) -> bool {
        let center_hit =
            |set: &BTreeSet<CenterId>| center_id.map_or(false, |id| set.contains(id));
        let cluster_hit =
            |set: &BTreeSet<ClusterId>| cluster_id.map_or(false, |id| set.contains(id));
        match self {
            LocationFilter::Unrestricted => true,
            LocationFilter::ByCenterSet { centers } => center_hit(centers),
            LocationFilter::ByClusterSet { clusters } => cluster_hit(clusters),
            LocationFilter::Either { centers, clusters } => {
                center_hit(centers) || cluster_hit(clusters)
            }
        }
    }
}
