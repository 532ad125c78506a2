//! HTTP handlers for dashboard endpoints.
//!
//! These handlers connect Axum routes to application layer query handlers.

use std::sync::Arc;

use axum::extract::{Json, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::dashboard::{
    DashboardError, DashboardQuery, FetchSubmissionsHandler, FetchSubmissionsQuery,
    GetDashboardSnapshotHandler, GetDashboardSummaryHandler, GetTrendsHandler,
    ResolveScopeHandler, ResolveScopeQuery, ScopedReader,
};
use crate::domain::dashboard::DEFAULT_TREND_BUCKET_CAP;
use crate::domain::foundation::{
    CenterId, ClusterId, DateWindow, ErrorCode, RegionId, ValidationError,
};
use crate::domain::scope::{Role, UserScope};
use crate::ports::{Clock, RecordStore, SnapshotCache};

use super::dto::{
    DashboardParams, DashboardSnapshot, DashboardSummary, DetailParams, ErrorResponse,
    HealthResponse, ListingPage, ScopeResponse, SubmissionDetail, SubmissionsParams,
    TrendSeries,
};

/// Default cap on submission rows read for the listing.
pub const DEFAULT_LIST_ROW_CAP: u32 = 200;

// ════════════════════════════════════════════════════════════════════════════════
// Error Type
// ════════════════════════════════════════════════════════════════════════════════

/// Dashboard API error that implements IntoResponse.
#[derive(Debug)]
pub enum DashboardApiError {
    BadRequest(String),
    Unauthorized(String),
    /// Scope problems carry the end-user message, never an empty table.
    Forbidden { code: ErrorCode, message: String },
    NotFound(String),
    Unavailable(String),
}

impl IntoResponse for DashboardApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            DashboardApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::bad_request(msg))
            }
            DashboardApiError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorResponse::unauthorized(msg))
            }
            DashboardApiError::Forbidden { code, message } => {
                (StatusCode::FORBIDDEN, ErrorResponse::new(code, message))
            }
            DashboardApiError::NotFound(key) => {
                (StatusCode::NOT_FOUND, ErrorResponse::not_found("Submission", &key))
            }
            DashboardApiError::Unavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, ErrorResponse::unavailable(msg))
            }
        };
        (status, Json(error)).into_response()
    }
}

impl From<DashboardError> for DashboardApiError {
    fn from(error: DashboardError) -> Self {
        let code = error.code();
        match error {
            DashboardError::Scope(e) => DashboardApiError::Forbidden {
                code,
                message: e.user_message(),
            },
            DashboardError::Store(e) => {
                tracing::error!("Record store failure: {}", e);
                DashboardApiError::Unavailable(
                    "Dashboard data is temporarily unavailable. Please try again.".to_string(),
                )
            }
            DashboardError::InvalidInput(msg) => DashboardApiError::BadRequest(msg),
            DashboardError::NotFound(key) => DashboardApiError::NotFound(key),
        }
    }
}

impl From<ValidationError> for DashboardApiError {
    fn from(error: ValidationError) -> Self {
        DashboardApiError::BadRequest(error.to_string())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing dashboard dependencies.
#[derive(Clone)]
pub struct DashboardAppState {
    pub record_store: Arc<dyn RecordStore>,
    pub clock: Arc<dyn Clock>,
    pub snapshot_cache: Option<Arc<dyn SnapshotCache>>,
    pub list_row_cap: u32,
    pub trend_bucket_cap: usize,
}

impl DashboardAppState {
    pub fn new(record_store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            record_store,
            clock,
            snapshot_cache: None,
            list_row_cap: DEFAULT_LIST_ROW_CAP,
            trend_bucket_cap: DEFAULT_TREND_BUCKET_CAP,
        }
    }

    pub fn with_limits(mut self, list_row_cap: u32, trend_bucket_cap: usize) -> Self {
        self.list_row_cap = list_row_cap;
        self.trend_bucket_cap = trend_bucket_cap;
        self
    }

    pub fn with_snapshot_cache(mut self, cache: Arc<dyn SnapshotCache>) -> Self {
        self.snapshot_cache = Some(cache);
        self
    }

    fn reader(&self) -> ScopedReader {
        ScopedReader::new(self.record_store.clone())
    }

    pub fn resolve_scope_handler(&self) -> ResolveScopeHandler {
        ResolveScopeHandler::new(self.reader())
    }

    pub fn fetch_submissions_handler(&self) -> FetchSubmissionsHandler {
        FetchSubmissionsHandler::new(self.reader(), self.clock.clone(), self.list_row_cap)
    }

    pub fn summary_handler(&self) -> GetDashboardSummaryHandler {
        GetDashboardSummaryHandler::new(self.reader(), self.clock.clone())
    }

    pub fn trends_handler(&self) -> GetTrendsHandler {
        GetTrendsHandler::new(self.reader(), self.clock.clone(), self.trend_bucket_cap)
    }

    pub fn snapshot_handler(&self) -> GetDashboardSnapshotHandler {
        let handler = GetDashboardSnapshotHandler::new(
            self.reader(),
            self.clock.clone(),
            self.trend_bucket_cap,
        );
        match &self.snapshot_cache {
            Some(cache) => handler.with_cache(cache.clone()),
            None => handler,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Caller Context
// ════════════════════════════════════════════════════════════════════════════════

/// Caller role and assignment, as forwarded by the authentication gateway.
#[derive(Debug, Clone)]
pub struct CallerScope(pub UserScope);

/// Rejection type for CallerScope extraction.
#[derive(Debug)]
pub enum CallerScopeRejection {
    Missing,
    Invalid(String),
}

impl IntoResponse for CallerScopeRejection {
    fn into_response(self) -> axum::response::Response {
        match self {
            CallerScopeRejection::Missing => {
                DashboardApiError::Unauthorized("Authentication is required".to_string())
                    .into_response()
            }
            CallerScopeRejection::Invalid(msg) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(ErrorCode::InvalidFormat, msg)),
            )
                .into_response(),
        }
    }
}

fn header_value<'a>(
    headers: &'a axum::http::HeaderMap,
    name: &str,
) -> Result<Option<&'a str>, CallerScopeRejection> {
    match headers.get(name) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .map(|s| Some(s.trim()).filter(|s| !s.is_empty()))
            .map_err(|_| {
                CallerScopeRejection::Invalid(format!("Header {} is not valid text", name))
            }),
    }
}

fn header_id<T: std::str::FromStr>(
    headers: &axum::http::HeaderMap,
    name: &str,
) -> Result<Option<T>, CallerScopeRejection> {
    header_value(headers, name)?
        .map(|raw| {
            raw.parse::<T>().map_err(|_| {
                CallerScopeRejection::Invalid(format!("Header {} must be a UUID", name))
            })
        })
        .transpose()
}

/// Reads the caller's scope from trusted gateway headers.
///
/// Assignment ids the role does not need are ignored; ids the role needs
/// but lacks surface later as a scope misconfiguration.
pub fn caller_scope_from_headers(
    headers: &axum::http::HeaderMap,
) -> Result<UserScope, CallerScopeRejection> {
    let role: Role = header_value(headers, "x-user-role")?
        .ok_or(CallerScopeRejection::Missing)?
        .parse()
        .map_err(|e: ValidationError| CallerScopeRejection::Invalid(e.to_string()))?;

    Ok(UserScope {
        role,
        region_id: header_id::<RegionId>(headers, "x-region-id")?,
        cluster_id: header_id::<ClusterId>(headers, "x-cluster-id")?,
        center_id: header_id::<CenterId>(headers, "x-center-id")?,
    })
}

impl<S> axum::extract::FromRequestParts<S> for CallerScope
where
    S: Send + Sync,
{
    type Rejection = CallerScopeRejection;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move { caller_scope_from_headers(&parts.headers).map(CallerScope) })
    }
}

fn dashboard_query(
    user: UserScope,
    params: &DashboardParams,
    default_window: DateWindow,
) -> Result<DashboardQuery, DashboardApiError> {
    let query = DashboardQuery::new(user, params.window_or(default_window)?);
    Ok(match params.location()? {
        Some(location) => query.narrowed_to(location),
        None => query,
    })
}

fn submissions_query(
    user: UserScope,
    params: &DashboardParams,
) -> Result<FetchSubmissionsQuery, DashboardApiError> {
    let mut query = FetchSubmissionsQuery::new(user);
    query.window = params.window_or(DateWindow::All)?;
    query.location = params.location()?;
    Ok(query)
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// GET /api/scope
///
/// Returns the caller's resolved access grant and the nodes it may
/// narrow results to.
pub async fn get_scope(
    State(state): State<DashboardAppState>,
    CallerScope(user): CallerScope,
) -> Result<Json<ScopeResponse>, DashboardApiError> {
    let resolved = state
        .resolve_scope_handler()
        .with_options(ResolveScopeQuery { user: user.clone() })
        .await?;
    Ok(Json(ScopeResponse::new(user, resolved)))
}

/// GET /api/submissions?search=&sort=&order=&page=&page_size=&group_by_month=
///
/// Returns one page of the collated submission table.
pub async fn list_submissions(
    State(state): State<DashboardAppState>,
    Query(params): Query<SubmissionsParams>,
    CallerScope(user): CallerScope,
) -> Result<Json<ListingPage>, DashboardApiError> {
    let mut query = submissions_query(user, &params.dashboard())?;
    query.listing = params.listing()?;

    let page = state.fetch_submissions_handler().handle(query).await?;
    Ok(Json(page))
}

/// GET /api/submissions/detail?key=
///
/// Returns the attendance breakdown and offering split of one record.
pub async fn get_submission_detail(
    State(state): State<DashboardAppState>,
    Query(params): Query<DetailParams>,
    CallerScope(user): CallerScope,
) -> Result<Json<SubmissionDetail>, DashboardApiError> {
    let query = submissions_query(user, &params.dashboard())?;
    let detail = state
        .fetch_submissions_handler()
        .detail(query, params.key.trim())
        .await?;
    Ok(Json(detail))
}

/// GET /api/dashboard/summary?window=&region_id=&cluster_id=
pub async fn get_summary(
    State(state): State<DashboardAppState>,
    Query(params): Query<DashboardParams>,
    CallerScope(user): CallerScope,
) -> Result<Json<DashboardSummary>, DashboardApiError> {
    let query = dashboard_query(user, &params, DateWindow::All)?;
    let summary = state.summary_handler().handle(query).await?;
    Ok(Json(summary))
}

/// GET /api/dashboard/trends?window=&region_id=&cluster_id=
pub async fn get_trends(
    State(state): State<DashboardAppState>,
    Query(params): Query<DashboardParams>,
    CallerScope(user): CallerScope,
) -> Result<Json<TrendSeries>, DashboardApiError> {
    let query = dashboard_query(user, &params, DateWindow::All)?;
    let series = state.trends_handler().handle(query).await?;
    Ok(Json(series))
}

/// GET /api/dashboard?window=&region_id=&cluster_id=
///
/// Summary and trends computed from one scoped fetch.
pub async fn get_snapshot(
    State(state): State<DashboardAppState>,
    Query(params): Query<DashboardParams>,
    CallerScope(user): CallerScope,
) -> Result<Json<DashboardSnapshot>, DashboardApiError> {
    let query = dashboard_query(user, &params, DateWindow::All)?;
    let snapshot = state.snapshot_handler().handle(query).await?;
    Ok(Json(snapshot))
}
