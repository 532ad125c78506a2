use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::foundation::DateWindow;
use crate::domain::submission::{
    total_attendance, total_offering, AttendanceSubmission, OfferingSplit, OfferingSubmission,
};

/// Organization-wide node counts. Never filtered by the caller's grant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationCounts {
    pub clusters: u64,
    pub centers: u64,
}

/// Headline dashboard figures for one scope and window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// Sum of self-healed attendance totals
    pub total_attendance: u64,

    /// Sum of `amount_100`
    pub total_offering: Decimal,

    /// 80/20 shares derived from `total_offering`, rounded for display
    pub offering_split: OfferingSplit,

    pub cluster_count: u64,
    pub center_count: u64,

    /// Window the totals cover
    pub window: DateWindow,
    pub window_caption: &'static str,
    pub since: Option<NaiveDate>,
}

impl DashboardSummary {
    /// Aggregates already-scoped records.
    ///
    /// Callers pass the full windowed record sets; nothing here caps or
    /// samples, so the totals always cover every matching record.
    pub fn aggregate(
        attendance: &[AttendanceSubmission],
        offerings: &[OfferingSubmission],
        counts: OrganizationCounts,
        window: DateWindow,
        today: NaiveDate,
    ) -> Self {
        let total_offering = total_offering(offerings);
        Self {
            total_attendance: total_attendance(attendance),
            total_offering,
            offering_split: OfferingSplit::from_amount(total_offering).rounded(),
            cluster_count: counts.clusters,
            center_count: counts.centers,
            window,
            window_caption: window.caption(),
            since: window.start_date(today),
        }
    }

    /// Zero-valued summary. A valid scope with no records yields this.
    pub fn empty(counts: OrganizationCounts, window: DateWindow, today: NaiveDate) -> Self {
        Self::aggregate(&[], &[], counts, window, today)
    }

    pub fn has_activity(&self) -> bool {
        self.total_attendance > 0 || !self.total_offering.is_zero()
    }
}

#[cfg(test)]
#[path = "summary_test.rs"]
mod summary_test;
