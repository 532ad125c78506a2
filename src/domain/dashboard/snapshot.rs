use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::foundation::DateWindow;
use crate::domain::submission::{AttendanceSubmission, OfferingSubmission};

use super::{build_trends, DashboardSummary, OrganizationCounts, TrendSeries};

/// Summary and trend series computed from the same record sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub summary: DashboardSummary,
    pub trends: TrendSeries,
    pub generated_for: NaiveDate,
}

impl DashboardSnapshot {
    pub fn build(
        attendance: &[AttendanceSubmission],
        offerings: &[OfferingSubmission],
        counts: OrganizationCounts,
        window: DateWindow,
        today: NaiveDate,
        trend_bucket_cap: usize,
    ) -> Self {
        Self {
            summary: DashboardSummary::aggregate(attendance, offerings, counts, window, today),
            trends: build_trends(attendance, offerings, window, trend_bucket_cap),
            generated_for: today,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ClusterId, ServiceTypeId};
    use crate::domain::submission::{AttendanceCounts, SubmissionHeader};
    use chrono::Duration;
    use rust_decimal::Decimal;

    #[test]
    fn summary_covers_buckets_the_series_drops() {
        let today = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let cluster = ClusterId::new();
        let st = ServiceTypeId::new();
        let attendance: Vec<_> = (0..20)
            .map(|d| {
                AttendanceSubmission::new(
                    SubmissionHeader::for_cluster(cluster, st, today - Duration::days(d)),
                    AttendanceCounts {
                        visitors_brothers: 1,
                        ..Default::default()
                    },
                )
            })
            .collect();
        let offerings = vec![OfferingSubmission::new(
            SubmissionHeader::for_cluster(cluster, st, today - Duration::days(19)),
            Decimal::from(100),
        )];

        let snapshot = DashboardSnapshot::build(
            &attendance,
            &offerings,
            OrganizationCounts::default(),
            DateWindow::All,
            today,
            14,
        );

        assert_eq!(snapshot.summary.total_attendance, 20);
        assert_eq!(snapshot.summary.total_offering, Decimal::from(100));
        assert_eq!(snapshot.trends.len(), 14);
        let charted: u64 = snapshot.trends.attendance.iter().map(|p| p.value).sum();
        assert_eq!(charted, 14);
        assert!(snapshot.trends.offering.iter().all(|p| p.value.is_zero()));
    }
}
