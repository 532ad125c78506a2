//! Portal roles and the caller's assigned hierarchy node.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{CenterId, ClusterId, RegionId, ValidationError};

use super::ScopeError;

/// Role of a portal user, from widest to narrowest reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    RegionAdmin,
    ClusterAdmin,
    CenterRep,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::RegionAdmin => "region_admin",
            Role::ClusterAdmin => "cluster_admin",
            Role::CenterRep => "center_rep",
        }
    }

    /// Roles that see cluster-level and general submissions.
    pub fn is_admin(&self) -> bool {
        !matches!(self, Role::CenterRep)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(Role::SuperAdmin),
            "region_admin" => Ok(Role::RegionAdmin),
            "cluster_admin" => Ok(Role::ClusterAdmin),
            "center_rep" => Ok(Role::CenterRep),
            other => Err(ValidationError::invalid_format(
                "role",
                format!("unknown role '{}'", other),
            )),
        }
    }
}

/// The caller's role and assigned node, as read from their profile.
///
/// Read-only input to every dashboard query. Which of the optional ids
/// must be present depends on the role; see [`UserScope::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserScope {
    pub role: Role,
    pub region_id: Option<RegionId>,
    pub cluster_id: Option<ClusterId>,
    pub center_id: Option<CenterId>,
}

impl UserScope {
    pub fn super_admin() -> Self {
        Self {
            role: Role::SuperAdmin,
            region_id: None,
            cluster_id: None,
            center_id: None,
        }
    }

    pub fn region_admin(region_id: RegionId) -> Self {
        Self {
            role: Role::RegionAdmin,
            region_id: Some(region_id),
            cluster_id: None,
            center_id: None,
        }
    }

    pub fn cluster_admin(cluster_id: ClusterId) -> Self {
        Self {
            role: Role::ClusterAdmin,
            region_id: None,
            cluster_id: Some(cluster_id),
            center_id: None,
        }
    }

    pub fn center_rep(center_id: CenterId) -> Self {
        Self {
            role: Role::CenterRep,
            region_id: None,
            cluster_id: None,
            center_id: Some(center_id),
        }
    }

    /// Assigned region, required for `region_admin`.
    pub fn assigned_region(&self) -> Result<RegionId, ScopeError> {
        self.region_id.ok_or(ScopeError::MissingRegion)
    }

    /// Assigned cluster, required for `cluster_admin`.
    pub fn assigned_cluster(&self) -> Result<ClusterId, ScopeError> {
        self.cluster_id.ok_or(ScopeError::MissingCluster)
    }

    /// Assigned center, required for `center_rep`.
    pub fn assigned_center(&self) -> Result<CenterId, ScopeError> {
        self.center_id.ok_or(ScopeError::MissingCenter)
    }

    /// Checks that the role carries the assignment it needs.
    pub fn validate(&self) -> Result<(), ScopeError> {
        match self.role {
            Role::SuperAdmin => Ok(()),
            Role::RegionAdmin => self.assigned_region().map(|_| ()),
            Role::ClusterAdmin => self.assigned_cluster().map(|_| ()),
            Role::CenterRep => self.assigned_center().map(|_| ()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_snake_case_names() {
        assert_eq!("center_rep".parse::<Role>().unwrap(), Role::CenterRep);
        assert_eq!("super_admin".parse::<Role>().unwrap(), Role::SuperAdmin);
        assert!("pastor".parse::<Role>().is_err());
    }

    #[test]
    fn role_serializes_snake_case() {
        let json = serde_json::to_string(&Role::RegionAdmin).unwrap();
        assert_eq!(json, "\"region_admin\"");
    }

    #[test]
    fn only_center_rep_is_not_admin() {
        assert!(Role::SuperAdmin.is_admin());
        assert!(Role::ClusterAdmin.is_admin());
        assert!(!Role::CenterRep.is_admin());
    }

    #[test]
    fn super_admin_needs_no_assignment() {
        assert!(UserScope::super_admin().validate().is_ok());
    }

    #[test]
    fn center_rep_without_center_is_misconfigured() {
        let user = UserScope {
            role: Role::CenterRep,
            region_id: None,
            cluster_id: Some(ClusterId::new()),
            center_id: None,
        };
        assert_eq!(user.validate(), Err(ScopeError::MissingCenter));
    }

    #[test]
    fn region_admin_without_region_is_misconfigured() {
        let user = UserScope {
            role: Role::RegionAdmin,
            region_id: None,
            cluster_id: None,
            center_id: None,
        };
        assert_eq!(user.validate(), Err(ScopeError::MissingRegion));
    }

    #[test]
    fn constructors_satisfy_their_own_invariants() {
        assert!(UserScope::region_admin(RegionId::new()).validate().is_ok());
        assert!(UserScope::cluster_admin(ClusterId::new()).validate().is_ok());
        assert!(UserScope::center_rep(CenterId::new()).validate().is_ok());
    }
}
