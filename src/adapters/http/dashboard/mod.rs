//! Dashboard HTTP adapter module.
//!
//! Provides REST API endpoints for scope, submission and dashboard queries.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::ErrorResponse;
pub use handlers::{CallerScope, DashboardApiError, DashboardAppState};
pub use routes::dashboard_routes;
