//! Dashboard aggregates: headline summary and trend series.

mod snapshot;
mod summary;
mod trends;

pub use snapshot::DashboardSnapshot;
pub use summary::{DashboardSummary, OrganizationCounts};
pub use trends::{build_trends, TrendPoint, TrendSeries, DEFAULT_TREND_BUCKET_CAP};
