//! HTTP DTOs for dashboard endpoints.
//!
//! Every endpoint is a read, so requests are query-string parameter
//! structs and responses are mostly the domain views themselves.

pub use crate::domain::dashboard::{DashboardSnapshot, DashboardSummary, TrendSeries};
pub use crate::domain::submission::{ListingPage, SubmissionDetail};

use serde::{Deserialize, Serialize};

use crate::application::handlers::dashboard::{OverrideOptions, ScopeWithOptions};
use crate::domain::foundation::{
    CenterId, ClusterId, DateWindow, ErrorCode, RegionId, ValidationError,
};
use crate::domain::scope::{AccessScope, LocationOverride, Role, UserScope};
use crate::domain::submission::{ListingQuery, ListingSort, SortDirection, DEFAULT_PAGE_SIZE};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Window and optional location override shared by every dashboard read.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardParams {
    pub window: Option<String>,
    pub region_id: Option<String>,
    pub cluster_id: Option<String>,
    pub center_id: Option<String>,
}

impl DashboardParams {
    /// Parsed window, or `default` when absent.
    pub fn window_or(&self, default: DateWindow) -> Result<DateWindow, ValidationError> {
        match self.window.as_deref().map(str::trim) {
            None | Some("") => Ok(default),
            Some(raw) => raw.parse(),
        }
    }

    /// Parsed override. The narrowest node given wins: center, then
    /// cluster, then region.
    pub fn location(&self) -> Result<Option<LocationOverride>, ValidationError> {
        if let Some(raw) = non_blank(&self.center_id) {
            let id: CenterId = raw
                .parse()
                .map_err(|_| ValidationError::invalid_format("center_id", "expected a UUID"))?;
            return Ok(Some(LocationOverride::Center(id)));
        }
        if let Some(raw) = non_blank(&self.cluster_id) {
            let id: ClusterId = raw
                .parse()
                .map_err(|_| ValidationError::invalid_format("cluster_id", "expected a UUID"))?;
            return Ok(Some(LocationOverride::Cluster(id)));
        }
        if let Some(raw) = non_blank(&self.region_id) {
            let id: RegionId = raw
                .parse()
                .map_err(|_| ValidationError::invalid_format("region_id", "expected a UUID"))?;
            return Ok(Some(LocationOverride::Region(id)));
        }
        Ok(None)
    }
}

/// Query string for `GET /api/submissions`.
#[derive(Debug, Default, Deserialize)]
pub struct SubmissionsParams {
    pub window: Option<String>,
    pub region_id: Option<String>,
    pub cluster_id: Option<String>,
    pub center_id: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub group_by_month: Option<bool>,
}

impl SubmissionsParams {
    pub fn dashboard(&self) -> DashboardParams {
        DashboardParams {
            window: self.window.clone(),
            region_id: self.region_id.clone(),
            cluster_id: self.cluster_id.clone(),
            center_id: self.center_id.clone(),
        }
    }

    pub fn listing(&self) -> Result<ListingQuery, ValidationError> {
        let sort = match non_blank(&self.sort) {
            Some(raw) => raw.parse::<ListingSort>()?,
            None => ListingSort::Date,
        };
        let direction = match non_blank(&self.order) {
            None | Some("desc") => SortDirection::Descending,
            Some("asc") => SortDirection::Ascending,
            Some(other) => {
                return Err(ValidationError::invalid_format(
                    "order",
                    format!("expected asc or desc, got '{}'", other),
                ))
            }
        };
        Ok(ListingQuery {
            search: non_blank(&self.search).map(str::to_string),
            sort,
            direction,
            page: self.page.unwrap_or(1),
            page_size: self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            group_by_month: self.group_by_month.unwrap_or(false),
        })
    }
}

/// Query string for `GET /api/submissions/detail`.
#[derive(Debug, Deserialize)]
pub struct DetailParams {
    pub key: String,
    pub window: Option<String>,
    pub region_id: Option<String>,
    pub cluster_id: Option<String>,
    pub center_id: Option<String>,
}

impl DetailParams {
    pub fn dashboard(&self) -> DashboardParams {
        DashboardParams {
            window: self.window.clone(),
            region_id: self.region_id.clone(),
            cluster_id: self.cluster_id.clone(),
            center_id: self.center_id.clone(),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Caller identity, the grant it resolves to and the override picker.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeResponse {
    pub role: Role,
    pub region_id: Option<RegionId>,
    pub cluster_id: Option<ClusterId>,
    pub center_id: Option<CenterId>,
    pub scope: AccessScope,
    pub options: OverrideOptions,
}

impl ScopeResponse {
    pub fn new(user: UserScope, resolved: ScopeWithOptions) -> Self {
        Self {
            role: user.role,
            region_id: user.region_id,
            cluster_id: user.cluster_id,
            center_id: user.center_id,
            scope: resolved.scope,
            options: resolved.options,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    pub fn not_found(resource_type: &str, id: &str) -> Self {
        Self::new(ErrorCode::NotFound, format!("{} not found: {}", resource_type, id))
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthenticated, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StoreUnavailable, message)
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_window_uses_default() {
        let params = DashboardParams::default();
        assert_eq!(params.window_or(DateWindow::Last30Days).unwrap(), DateWindow::Last30Days);
    }

    #[test]
    fn test_unknown_window_is_rejected() {
        let params = DashboardParams {
            window: Some("14d".to_string()),
            ..Default::default()
        };
        assert!(params.window_or(DateWindow::All).is_err());
    }

    #[test]
    fn test_cluster_override_wins_over_region() {
        let cluster = ClusterId::new();
        let params = DashboardParams {
            region_id: Some(RegionId::new().to_string()),
            cluster_id: Some(cluster.to_string()),
            ..Default::default()
        };
        assert_eq!(params.location().unwrap(), Some(LocationOverride::Cluster(cluster)));
    }

    #[test]
    fn test_center_override_is_narrowest() {
        let center = CenterId::new();
        let params = DashboardParams {
            cluster_id: Some(ClusterId::new().to_string()),
            center_id: Some(center.to_string()),
            ..Default::default()
        };
        assert_eq!(params.location().unwrap(), Some(LocationOverride::Center(center)));
    }

    #[test]
    fn test_malformed_center_id_is_rejected() {
        let params = DashboardParams {
            center_id: Some("hilltop".to_string()),
            ..Default::default()
        };
        assert!(params.location().is_err());
    }

    #[test]
    fn test_blank_override_is_ignored() {
        let params = DashboardParams {
            region_id: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(params.location().unwrap(), None);
    }

    #[test]
    fn test_listing_defaults() {
        let listing = SubmissionsParams::default().listing().unwrap();
        assert_eq!(listing, ListingQuery::default());
    }

    #[test]
    fn test_listing_rejects_unknown_order() {
        let params = SubmissionsParams {
            order: Some("sideways".to_string()),
            ..Default::default()
        };
        assert!(params.listing().is_err());
    }

    #[test]
    fn test_error_response_omits_empty_details() {
        let json = serde_json::to_value(ErrorResponse::bad_request("nope")).unwrap();
        assert_eq!(json["code"], "VALIDATION_FAILED");
        assert!(json.get("details").is_none());
    }
}
