//! Date-bucketed attendance and offering series for trend charts.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::foundation::DateWindow;
use crate::domain::submission::{AttendanceSubmission, OfferingSubmission};

/// Buckets kept for display on long windows.
pub const DEFAULT_TREND_BUCKET_CAP: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint<T> {
    pub date: NaiveDate,
    pub value: T,
}

/// Two series over the same ascending date keys.
///
/// A truncated series is a display cap only. Totals must be taken from
/// the summary, never re-derived from these points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSeries {
    pub attendance: Vec<TrendPoint<u64>>,
    pub offering: Vec<TrendPoint<Decimal>>,
    /// Buckets before truncation.
    pub total_buckets: usize,
    pub truncated: bool,
}

impl TrendSeries {
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.attendance.iter().map(|p| p.date)
    }

    pub fn is_empty(&self) -> bool {
        self.attendance.is_empty()
    }

    pub fn len(&self) -> usize {
        self.attendance.len()
    }
}

/// Buckets records by service date and aligns both series on the union of
/// dates. A date missing on one side gets zero there.
///
/// For `90d` and `all` only the most recent `cap` buckets are kept.
pub fn build_trends(
    attendance: &[AttendanceSubmission],
    offerings: &[OfferingSubmission],
    window: DateWindow,
    cap: usize,
) -> TrendSeries {
    let mut buckets: BTreeMap<NaiveDate, (u64, Decimal)> = BTreeMap::new();

    for record in attendance {
        let bucket = buckets.entry(record.header.service_date).or_default();
        bucket.0 += record.displayed_total();
    }
    for record in offerings {
        let bucket = buckets.entry(record.header.service_date).or_default();
        bucket.1 += record.amount_100;
    }

    let total_buckets = buckets.len();
    let skip = if window.caps_trend_series() {
        total_buckets.saturating_sub(cap)
    } else {
        0
    };

    let (attendance, offering): (Vec<_>, Vec<_>) = buckets
        .into_iter()
        .skip(skip)
        .map(|(date, (people, amount))| {
            (
                TrendPoint { date, value: people },
                TrendPoint { date, value: amount },
            )
        })
        .unzip();

    TrendSeries {
        attendance,
        offering,
        total_buckets,
        truncated: skip > 0,
    }
}
