//! Access scope resolution.
//!
//! Given a caller's [`UserScope`] and the slice of the hierarchy under
//! their assigned node, computes the set of node ids they may see. The
//! grant is always the full subtree rooted at the assigned node;
//! `super_admin` is unrestricted.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::foundation::{CenterId, ClusterId, RegionId};
use crate::domain::hierarchy::Hierarchy;

use super::{Role, ScopeError, UserScope};

/// Set of hierarchy nodes a caller is permitted to see.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessScope {
    pub region_ids: BTreeSet<RegionId>,
    pub cluster_ids: BTreeSet<ClusterId>,
    pub center_ids: BTreeSet<CenterId>,
    /// When true the id sets are empty and every node is visible.
    pub unrestricted: bool,
}

/// A privileged caller's request to narrow results to one node.
///
/// Narrows the query only; the caller's grant is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum LocationOverride {
    Region(RegionId),
    Cluster(ClusterId),
    Center(CenterId),
}

impl LocationOverride {
    fn target(&self) -> &'static str {
        match self {
            LocationOverride::Region(_) => "region",
            LocationOverride::Cluster(_) => "cluster",
            LocationOverride::Center(_) => "center",
        }
    }

    fn id_string(&self) -> String {
        match self {
            LocationOverride::Region(id) => id.to_string(),
            LocationOverride::Cluster(id) => id.to_string(),
            LocationOverride::Center(id) => id.to_string(),
        }
    }
}

impl AccessScope {
    /// Full access to every node.
    pub fn unrestricted() -> Self {
        Self {
            unrestricted: true,
            ..Self::default()
        }
    }

    /// Resolves the grant for `user` against `hierarchy`.
    ///
    /// `hierarchy` only needs to contain the subtree under the user's
    /// assigned node. Nodes whose parent link is null are never part of a
    /// grant that is rooted at a non-null parent.
    pub fn resolve(user: &UserScope, hierarchy: &Hierarchy) -> Result<Self, ScopeError> {
        match user.role {
            Role::SuperAdmin => Ok(Self::unrestricted()),
            Role::RegionAdmin => {
                let region_id = user.assigned_region()?;
                let (cluster_ids, center_ids) = hierarchy.descendants_of_region(&region_id);
                Ok(Self {
                    region_ids: BTreeSet::from([region_id]),
                    cluster_ids,
                    center_ids,
                    unrestricted: false,
                })
            }
            Role::ClusterAdmin => {
                let cluster_id = user.assigned_cluster()?;
                Ok(Self {
                    region_ids: BTreeSet::new(),
                    cluster_ids: BTreeSet::from([cluster_id]),
                    center_ids: hierarchy.centers_in_cluster(&cluster_id),
                    unrestricted: false,
                })
            }
            Role::CenterRep => {
                let center_id = user.assigned_center()?;
                Ok(Self {
                    region_ids: BTreeSet::new(),
                    cluster_ids: BTreeSet::new(),
                    center_ids: BTreeSet::from([center_id]),
                    unrestricted: false,
                })
            }
        }
    }

    pub fn can_view_region(&self, id: &RegionId) -> bool {
        self.unrestricted || self.region_ids.contains(id)
    }

    pub fn can_view_cluster(&self, id: &ClusterId) -> bool {
        self.unrestricted || self.cluster_ids.contains(id)
    }

    pub fn can_view_center(&self, id: &CenterId) -> bool {
        self.unrestricted || self.center_ids.contains(id)
    }

    /// True when a restricted grant contains no node at all.
    pub fn is_empty(&self) -> bool {
        !self.unrestricted
            && self.region_ids.is_empty()
            && self.cluster_ids.is_empty()
            && self.center_ids.is_empty()
    }

    /// Checks whether `user` may narrow results with `location`.
    ///
    /// - `super_admin` may pick any region, cluster or center.
    /// - `region_admin` may pick its own region, or a cluster or center
    ///   under it.
    /// - `cluster_admin` may name its own cluster or one of its centers.
    /// - `center_rep` may not override.
    pub fn authorize_override(
        &self,
        user: &UserScope,
        location: &LocationOverride,
    ) -> Result<(), ScopeError> {
        let outside = || ScopeError::OverrideOutsideGrant {
            target: location.target(),
            id: location.id_string(),
        };
        match (user.role, location) {
            (Role::SuperAdmin, _) => Ok(()),
            (Role::CenterRep, _) | (Role::ClusterAdmin, LocationOverride::Region(_)) => {
                Err(ScopeError::OverrideNotPermitted {
                    role: user.role,
                    target: location.target(),
                })
            }
            (_, LocationOverride::Region(id)) if self.can_view_region(id) => Ok(()),
            (_, LocationOverride::Cluster(id)) if self.can_view_cluster(id) => Ok(()),
            (_, LocationOverride::Center(id)) if self.can_view_center(id) => Ok(()),
            _ => Err(outside()),
        }
    }
}
