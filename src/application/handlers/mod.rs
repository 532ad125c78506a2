//! Application handlers.
//!
//! Query handlers that orchestrate domain operations over the ports.

pub mod dashboard;

pub use dashboard::{
    DashboardError, DashboardQuery, FetchSubmissionsHandler, FetchSubmissionsQuery,
    GetDashboardSnapshotHandler, GetDashboardSummaryHandler, GetTrendsHandler,
    ResolveScopeHandler, ResolveScopeQuery, ScopedReader,
};
