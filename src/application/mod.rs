//! Application layer - Queries and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Every operation here is a read; submission entry lives elsewhere.

pub mod handlers;

pub use handlers::{
    DashboardError, DashboardQuery, FetchSubmissionsHandler, FetchSubmissionsQuery,
    GetDashboardSnapshotHandler, GetDashboardSummaryHandler, GetTrendsHandler,
    ResolveScopeHandler, ResolveScopeQuery, ScopedReader,
};
