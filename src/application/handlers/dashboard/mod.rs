//! Dashboard query handlers.
//!
//! Read-only handlers that resolve a caller's scope, fetch the records
//! inside it and aggregate them for display.

mod error;
mod fetch_submissions;
mod get_dashboard_snapshot;
mod get_dashboard_summary;
mod get_trends;
mod query;
mod resolve_scope;
mod scoped_reader;

#[cfg(test)]
mod test_support;

pub use error::DashboardError;
pub use fetch_submissions::{
    FetchSubmissionsHandler, FetchSubmissionsQuery, FetchSubmissionsResult,
};
pub use get_dashboard_snapshot::{GetDashboardSnapshotHandler, GetDashboardSnapshotResult};
pub use get_dashboard_summary::{GetDashboardSummaryHandler, GetDashboardSummaryResult};
pub use get_trends::{GetTrendsHandler, GetTrendsResult};
pub use query::DashboardQuery;
pub use resolve_scope::{
    OverrideOptions, ResolveScopeHandler, ResolveScopeQuery, ResolveScopeResult, ScopeWithOptions,
};
pub use scoped_reader::{FetchScope, ResolvedScope, ScopedReader, ScopedRecords};
