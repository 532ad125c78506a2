use thiserror::Error;

use super::Role;

/// A caller's scope cannot be resolved as requested.
///
/// Always distinct from "no data": callers must show the actionable
/// message from [`ScopeError::user_message`] instead of an empty table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("Region admin account has no assigned region")]
    MissingRegion,

    #[error("Cluster admin account has no assigned cluster")]
    MissingCluster,

    #[error("Center representative account has no assigned center")]
    MissingCenter,

    #[error("Role {role} cannot narrow results to a {target}")]
    OverrideNotPermitted { role: Role, target: &'static str },

    #[error("Requested {target} {id} is outside the caller's access scope")]
    OverrideOutsideGrant { target: &'static str, id: String },
}

impl ScopeError {
    /// Whether the error comes from the user's profile rather than the request.
    pub fn is_misconfiguration(&self) -> bool {
        matches!(
            self,
            ScopeError::MissingRegion | ScopeError::MissingCluster | ScopeError::MissingCenter
        )
    }

    /// Message suitable for end users.
    pub fn user_message(&self) -> String {
        match self {
            ScopeError::MissingRegion => {
                "Your account is not assigned to a region. Please contact your administrator."
                    .to_string()
            }
            ScopeError::MissingCluster => {
                "Your account is not assigned to a cluster. Please contact your administrator."
                    .to_string()
            }
            ScopeError::MissingCenter => {
                "Your account is not assigned to a center. Please contact your administrator."
                    .to_string()
            }
            ScopeError::OverrideNotPermitted { target, .. } => {
                format!("You cannot filter the dashboard by {}.", target)
            }
            ScopeError::OverrideOutsideGrant { target, .. } => {
                format!("The selected {} is outside the area you manage.", target)
            }
        }
    }
}
