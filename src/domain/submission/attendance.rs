//! Attendance submissions and the self-healing total.

use serde::{Deserialize, Serialize};

use super::{Submission, SubmissionHeader};

/// Headcounts per category, split by brothers and sisters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceCounts {
    pub adult_brothers: u32,
    pub adult_sisters: u32,
    pub youth_brothers: u32,
    pub youth_sisters: u32,
    pub children_brothers: u32,
    pub children_sisters: u32,
    pub visitors_brothers: u32,
    pub visitors_sisters: u32,
}

impl AttendanceCounts {
    /// Sum of the eight category fields.
    pub fn manual_total(&self) -> u64 {
        [
            self.adult_brothers,
            self.adult_sisters,
            self.youth_brothers,
            self.youth_sisters,
            self.children_brothers,
            self.children_sisters,
            self.visitors_brothers,
            self.visitors_sisters,
        ]
        .iter()
        .map(|&n| u64::from(n))
        .sum()
    }

    pub fn adults(&self) -> u64 {
        u64::from(self.adult_brothers) + u64::from(self.adult_sisters)
    }

    pub fn youth(&self) -> u64 {
        u64::from(self.youth_brothers) + u64::from(self.youth_sisters)
    }

    pub fn children(&self) -> u64 {
        u64::from(self.children_brothers) + u64::from(self.children_sisters)
    }

    pub fn visitors(&self) -> u64 {
        u64::from(self.visitors_brothers) + u64::from(self.visitors_sisters)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSubmission {
    #[serde(flatten)]
    pub header: SubmissionHeader,
    #[serde(flatten)]
    pub counts: AttendanceCounts,
    /// Stored total. Historically miswritten on some rows.
    pub grand_total: u32,
}

impl AttendanceSubmission {
    pub fn new(header: SubmissionHeader, counts: AttendanceCounts) -> Self {
        let grand_total = u32::try_from(counts.manual_total()).unwrap_or(u32::MAX);
        Self {
            header,
            counts,
            grand_total,
        }
    }

    pub fn with_grand_total(mut self, grand_total: u32) -> Self {
        self.grand_total = grand_total;
        self
    }

    /// Total to use anywhere a headcount is shown or summed.
    ///
    /// The recomputed category sum wins whenever it is positive; the stored
    /// `grand_total` is used only when every category is zero.
    pub fn displayed_total(&self) -> u64 {
        let manual = self.counts.manual_total();
        if manual > 0 {
            manual
        } else {
            u64::from(self.grand_total)
        }
    }
}

impl Submission for AttendanceSubmission {
    fn header(&self) -> &SubmissionHeader {
        &self.header
    }
}

/// Sum of displayed totals across records.
pub fn total_attendance<'a>(records: impl IntoIterator<Item = &'a AttendanceSubmission>) -> u64 {
    records.into_iter().map(AttendanceSubmission::displayed_total).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{CenterId, ServiceTypeId};
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn header() -> SubmissionHeader {
        SubmissionHeader::for_center(
            CenterId::new(),
            ServiceTypeId::new(),
            NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
        )
    }

    fn counts(values: [u32; 8]) -> AttendanceCounts {
        AttendanceCounts {
            adult_brothers: values[0],
            adult_sisters: values[1],
            youth_brothers: values[2],
            youth_sisters: values[3],
            children_brothers: values[4],
            children_sisters: values[5],
            visitors_brothers: values[6],
            visitors_sisters: values[7],
        }
    }

    #[test]
    fn stale_grand_total_is_used_when_categories_are_zero() {
        let record = AttendanceSubmission::new(header(), AttendanceCounts::default())
            .with_grand_total(42);
        assert_eq!(record.displayed_total(), 42);
    }

    #[test]
    fn recomputed_sum_beats_wrong_grand_total() {
        let record = AttendanceSubmission::new(header(), counts([10, 12, 3, 4, 5, 6, 1, 2]))
            .with_grand_total(0);
        assert_eq!(record.displayed_total(), 43);
    }

    #[test]
    fn category_subtotals() {
        let c = counts([1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(c.adults(), 3);
        assert_eq!(c.youth(), 7);
        assert_eq!(c.children(), 11);
        assert_eq!(c.visitors(), 15);
        assert_eq!(c.manual_total(), 36);
    }

    #[test]
    fn new_stores_recomputed_grand_total() {
        let record = AttendanceSubmission::new(header(), counts([1, 1, 1, 1, 1, 1, 1, 1]));
        assert_eq!(record.grand_total, 8);
    }

    #[test]
    fn totals_sum_displayed_values() {
        let a = AttendanceSubmission::new(header(), counts([5, 5, 0, 0, 0, 0, 0, 0]));
        let b =
            AttendanceSubmission::new(header(), AttendanceCounts::default()).with_grand_total(7);
        assert_eq!(total_attendance([&a, &b]), 17);
    }

    #[test]
    fn serializes_flat_like_the_table_row() {
        let record = AttendanceSubmission::new(header(), counts([1, 0, 0, 0, 0, 0, 0, 0]));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["adultBrothers"], 1);
        assert_eq!(json["grandTotal"], 1);
        assert_eq!(json["submissionLevel"], "center");
    }

    proptest! {
        #[test]
        fn displayed_total_follows_self_healing_rule(
            values in proptest::array::uniform8(0u32..10_000),
            stored in 0u32..100_000,
        ) {
            let record =
                AttendanceSubmission::new(header(), counts(values)).with_grand_total(stored);
            let manual: u64 = values.iter().map(|&v| u64::from(v)).sum();
            if manual > 0 {
                prop_assert_eq!(record.displayed_total(), manual);
            } else {
                prop_assert_eq!(record.displayed_total(), u64::from(stored));
            }
        }
    }
}
