//! HTTP routes for dashboard endpoints.

use axum::routing::get;
use axum::Router;

use super::handlers::{
    get_scope, get_snapshot, get_submission_detail, get_summary, get_trends, health,
    list_submissions, DashboardAppState,
};

/// Creates the dashboard router with all routes.
pub fn dashboard_routes(state: DashboardAppState) -> Router {
    Router::new()
        .route("/health", get(health))
        // GET /api/scope
        .route("/api/scope", get(get_scope))
        // GET /api/submissions
        .route("/api/submissions", get(list_submissions))
        // GET /api/submissions/detail?key=
        .route("/api/submissions/detail", get(get_submission_detail))
        // GET /api/dashboard
        .route("/api/dashboard", get(get_snapshot))
        // GET /api/dashboard/summary
        .route("/api/dashboard/summary", get(get_summary))
        // GET /api/dashboard/trends
        .route("/api/dashboard/trends", get(get_trends))
        .with_state(state)
}
