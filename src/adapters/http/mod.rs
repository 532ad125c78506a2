//! HTTP adapters - REST API implementations.

pub mod dashboard;

pub use dashboard::{dashboard_routes, DashboardAppState};
