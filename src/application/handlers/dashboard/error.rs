use crate::domain::foundation::{ErrorCode, ValidationError};
use crate::domain::scope::ScopeError;
use crate::ports::StoreError;

/// Errors returned by the dashboard query handlers.
///
/// There is no "empty" variant: a valid scope with no records is a
/// successful, zero-valued result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DashboardError {
    #[error(transparent)]
    Scope(#[from] ScopeError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Submission not found: {0}")]
    NotFound(String),
}

impl From<ValidationError> for DashboardError {
    fn from(err: ValidationError) -> Self {
        DashboardError::InvalidInput(err.to_string())
    }
}

impl DashboardError {
    pub fn code(&self) -> ErrorCode {
        match self {
            DashboardError::Scope(e) if e.is_misconfiguration() => ErrorCode::ScopeMisconfigured,
            DashboardError::Scope(_) => ErrorCode::OverrideNotPermitted,
            DashboardError::Store(_) => ErrorCode::StoreUnavailable,
            DashboardError::InvalidInput(_) => ErrorCode::ValidationFailed,
            DashboardError::NotFound(_) => ErrorCode::NotFound,
        }
    }
}
