//! GetTrendsHandler - Query handler for the attendance and offering trend charts.

use std::sync::Arc;

use crate::domain::dashboard::{build_trends, TrendSeries};
use crate::ports::Clock;

use super::{DashboardError, DashboardQuery, FetchScope, ScopedReader};

pub type GetTrendsResult = TrendSeries;

pub struct GetTrendsHandler {
    reader: ScopedReader,
    clock: Arc<dyn Clock>,
    bucket_cap: usize,
}

impl GetTrendsHandler {
    pub fn new(reader: ScopedReader, clock: Arc<dyn Clock>, bucket_cap: usize) -> Self {
        Self {
            reader,
            clock,
            bucket_cap,
        }
    }

    #[tracing::instrument(skip_all, fields(role = %query.user.role, window = %query.window))]
    pub async fn handle(&self, query: DashboardQuery) -> Result<GetTrendsResult, DashboardError> {
        let today = self.clock.today();
        let resolved = self.reader.resolve(&query.user).await?;
        let records = self
            .reader
            .fetch_scoped(
                &resolved,
                FetchScope {
                    window: query.window,
                    location: query.location.as_ref(),
                    today,
                    limit: None,
                },
            )
            .await?;

        let series = build_trends(
            &records.attendance,
            &records.offerings,
            query.window,
            self.bucket_cap,
        );
        if series.truncated {
            tracing::debug!(
                "Trend series capped to {} of {} buckets",
                series.len(),
                series.total_buckets
            );
        }
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::dashboard::test_support::{Fixture, MockRecordStore};
    use crate::domain::dashboard::DEFAULT_TREND_BUCKET_CAP;
    use crate::domain::foundation::DateWindow;
    use crate::domain::scope::UserScope;
    use crate::domain::submission::{AttendanceCounts, AttendanceSubmission, SubmissionHeader};
    use crate::ports::FixedClock;
    use chrono::{Duration, NaiveDate};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    fn handler(store: MockRecordStore) -> GetTrendsHandler {
        GetTrendsHandler::new(
            ScopedReader::new(Arc::new(store)),
            Arc::new(FixedClock(today())),
            DEFAULT_TREND_BUCKET_CAP,
        )
    }

    fn weekly(fx: &Fixture, weeks: i64) -> Vec<AttendanceSubmission> {
        (0..weeks)
            .map(|w| {
                AttendanceSubmission::new(
                    SubmissionHeader::for_center(fx.c1, fx.sunday, today() - Duration::weeks(w)),
                    AttendanceCounts {
                        children_sisters: 3,
                        ..Default::default()
                    },
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_all_window_caps_to_latest_buckets() {
        let fx = Fixture::new();
        let store = MockRecordStore::new(fx.clone()).with_attendance(weekly(&fx, 20));

        let series = handler(store)
            .handle(DashboardQuery::new(UserScope::center_rep(fx.c1), DateWindow::All))
            .await
            .unwrap();

        assert_eq!(series.len(), 14);
        assert_eq!(series.total_buckets, 20);
        assert_eq!(series.attendance.last().map(|p| p.date), Some(today()));
    }

    #[tokio::test]
    async fn test_thirty_day_window_is_not_capped() {
        let fx = Fixture::new();
        let store = MockRecordStore::new(fx.clone()).with_attendance(weekly(&fx, 20));

        let series = handler(store)
            .handle(DashboardQuery::new(UserScope::cluster_admin(fx.k1), DateWindow::Last30Days))
            .await
            .unwrap();

        assert_eq!(series.len(), 5);
        assert!(!series.truncated);
        assert_eq!(series.offering.len(), 5);
    }

    #[tokio::test]
    async fn test_out_of_scope_center_yields_empty_series() {
        let fx = Fixture::new();
        let store = MockRecordStore::new(fx.clone()).with_attendance(weekly(&fx, 3));

        let series = handler(store)
            .handle(DashboardQuery::new(UserScope::center_rep(fx.c4), DateWindow::All))
            .await
            .unwrap();

        assert!(series.is_empty());
    }
}
