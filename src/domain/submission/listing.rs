//! Listing view over collated records: search, sort, paging, month groups.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{ServiceTypeId, ValidationError};
use crate::domain::hierarchy::{Hierarchy, ServiceType};

use super::{
    AttendanceCounts, CollatedRecord, LocationKey, OfferingSplit, SortDirection, SubmissionLevel,
};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

const UNKNOWN_CENTER: &str = "Unknown Center";
const UNKNOWN_CLUSTER: &str = "Unknown";
const UNKNOWN_SERVICE: &str = "Unknown Service";
const GENERAL_LOCATION: &str = "General Organization";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingSort {
    #[default]
    Date,
    Attendance,
    Offering,
}

impl FromStr for ListingSort {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(ListingSort::Date),
            "attendance" => Ok(ListingSort::Attendance),
            "offering" => Ok(ListingSort::Offering),
            other => Err(ValidationError::invalid_format(
                "sort",
                format!("expected date, attendance or offering, got '{}'", other),
            )),
        }
    }
}

/// How a caller wants the collated rows presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingQuery {
    pub search: Option<String>,
    pub sort: ListingSort,
    pub direction: SortDirection,
    /// 1-based.
    pub page: u32,
    pub page_size: u32,
    pub group_by_month: bool,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            search: None,
            sort: ListingSort::Date,
            direction: SortDirection::Descending,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            group_by_month: false,
        }
    }
}

impl ListingQuery {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.page == 0 {
            return Err(ValidationError::out_of_range("page", 1, i64::from(u32::MAX), 0));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ValidationError::out_of_range(
                "page_size",
                1,
                i64::from(MAX_PAGE_SIZE),
                i64::from(self.page_size),
            ));
        }
        Ok(())
    }

    fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }
}

/// Reference data used to turn ids into display labels.
pub struct ListingLabels<'a> {
    hierarchy: &'a Hierarchy,
    service_types: HashMap<ServiceTypeId, &'a str>,
}

impl<'a> ListingLabels<'a> {
    pub fn new(hierarchy: &'a Hierarchy, service_types: &'a [ServiceType]) -> Self {
        Self {
            hierarchy,
            service_types: service_types
                .iter()
                .map(|st| (st.id, st.name.as_str()))
                .collect(),
        }
    }

    pub fn service_type(&self, id: &ServiceTypeId) -> &'a str {
        self.service_types.get(id).copied().unwrap_or(UNKNOWN_SERVICE)
    }

    pub fn location(&self, location: &LocationKey) -> String {
        match location {
            LocationKey::Center(id) => self
                .hierarchy
                .center_name(id)
                .unwrap_or(UNKNOWN_CENTER)
                .to_string(),
            LocationKey::Cluster(id) => format!(
                "{} Cluster",
                self.hierarchy.cluster_name(id).unwrap_or(UNKNOWN_CLUSTER)
            ),
            LocationKey::General => GENERAL_LOCATION.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingRow {
    pub key: String,
    pub service_date: NaiveDate,
    pub level: SubmissionLevel,
    pub level_label: &'static str,
    pub location_label: String,
    pub service_type_name: String,
    /// `None` renders as a dash.
    pub attendance_total: Option<u64>,
    pub offering_amount: Option<Decimal>,
}

impl ListingRow {
    pub fn from_record(record: &CollatedRecord, labels: &ListingLabels<'_>) -> Self {
        Self {
            key: record.key.to_string(),
            service_date: record.service_date(),
            level: record.level(),
            level_label: record.level().display_label(),
            location_label: labels.location(&record.key.location),
            service_type_name: labels.service_type(&record.service_type_id()).to_string(),
            attendance_total: record.attendance_total(),
            offering_amount: record.offering_amount(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthGroup {
    /// `YYYY-MM`.
    pub month: String,
    /// e.g. "April 2024".
    pub label: String,
    pub rows: Vec<ListingRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPage {
    pub rows: Vec<ListingRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<MonthGroup>>,
    pub page: u32,
    pub page_size: u32,
    pub total_rows: usize,
    pub total_pages: u32,
}

/// Collated records plus the labels needed to present them.
pub struct CollatedListing<'a> {
    records: &'a [CollatedRecord],
    labels: ListingLabels<'a>,
}

impl<'a> CollatedListing<'a> {
    pub fn new(records: &'a [CollatedRecord], labels: ListingLabels<'a>) -> Self {
        Self { records, labels }
    }

    fn matches_search(&self, record: &CollatedRecord, needle: &str) -> bool {
        let date = record.service_date().format("%Y-%m-%d").to_string();
        date.contains(needle)
            || self
                .labels
                .service_type(&record.service_type_id())
                .to_lowercase()
                .contains(needle)
    }

    /// Records surviving the search, in the requested order.
    ///
    /// Sorting is stable, so ties keep the collation order. Missing sides
    /// sort as zero.
    pub fn filtered(&self, query: &ListingQuery) -> Vec<&'a CollatedRecord> {
        let needle = query.needle();
        let mut rows: Vec<&'a CollatedRecord> = self
            .records
            .iter()
            .filter(|r| needle.as_deref().map_or(true, |n| self.matches_search(r, n)))
            .collect();

        let compare = |a: &&CollatedRecord, b: &&CollatedRecord| -> Ordering {
            match query.sort {
                ListingSort::Date => a.service_date().cmp(&b.service_date()),
                ListingSort::Attendance => a
                    .attendance_total()
                    .unwrap_or(0)
                    .cmp(&b.attendance_total().unwrap_or(0)),
                ListingSort::Offering => a
                    .offering_amount()
                    .unwrap_or(Decimal::ZERO)
                    .cmp(&b.offering_amount().unwrap_or(Decimal::ZERO)),
            }
        };
        if query.direction.is_ascending() {
            rows.sort_by(compare);
        } else {
            rows.sort_by(|a, b| compare(b, a));
        }
        rows
    }

    /// One page of labelled rows. A page past the end is empty, not an error.
    pub fn page(&self, query: &ListingQuery) -> Result<ListingPage, ValidationError> {
        query.validate()?;
        let filtered = self.filtered(query);
        let total_rows = filtered.len();
        let page_size = query.page_size as usize;
        let total_pages = u32::try_from(total_rows.div_ceil(page_size)).unwrap_or(u32::MAX);

        let start = (query.page as usize - 1).saturating_mul(page_size);
        let rows: Vec<ListingRow> = filtered
            .into_iter()
            .skip(start)
            .take(page_size)
            .map(|r| ListingRow::from_record(r, &self.labels))
            .collect();

        let groups = query.group_by_month.then(|| group_by_month(&rows));

        Ok(ListingPage {
            rows,
            groups,
            page: query.page,
            page_size: query.page_size,
            total_rows,
            total_pages,
        })
    }

    pub fn detail(&self, record: &CollatedRecord) -> SubmissionDetail {
        SubmissionDetail::new(record, &self.labels)
    }
}

/// Buckets rows by calendar month in first-seen order.
pub fn group_by_month(rows: &[ListingRow]) -> Vec<MonthGroup> {
    let mut groups: Vec<MonthGroup> = Vec::new();
    for row in rows {
        let month = row.service_date.format("%Y-%m").to_string();
        match groups.iter_mut().find(|g| g.month == month) {
            Some(group) => group.rows.push(row.clone()),
            None => groups.push(MonthGroup {
                label: row.service_date.format("%B %Y").to_string(),
                month,
                rows: vec![row.clone()],
            }),
        }
    }
    groups
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    pub brothers: u32,
    pub sisters: u32,
    pub total: u64,
}

impl CategoryCount {
    fn new(brothers: u32, sisters: u32) -> Self {
        Self {
            brothers,
            sisters,
            total: u64::from(brothers) + u64::from(sisters),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceBreakdown {
    pub adults: CategoryCount,
    pub youth: CategoryCount,
    pub children: CategoryCount,
    pub visitors: CategoryCount,
    pub total: u64,
}

impl AttendanceBreakdown {
    fn new(counts: &AttendanceCounts, total: u64) -> Self {
        Self {
            adults: CategoryCount::new(counts.adult_brothers, counts.adult_sisters),
            youth: CategoryCount::new(counts.youth_brothers, counts.youth_sisters),
            children: CategoryCount::new(counts.children_brothers, counts.children_sisters),
            visitors: CategoryCount::new(counts.visitors_brothers, counts.visitors_sisters),
            total,
        }
    }
}

/// Everything shown when a single listing row is opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionDetail {
    pub key: String,
    pub service_date: NaiveDate,
    pub level_label: &'static str,
    pub location_label: String,
    pub service_type_name: String,
    pub attendance: Option<AttendanceBreakdown>,
    pub offering: Option<OfferingSplit>,
}

impl SubmissionDetail {
    pub fn new(record: &CollatedRecord, labels: &ListingLabels<'_>) -> Self {
        Self {
            key: record.key.to_string(),
            service_date: record.service_date(),
            level_label: record.level().display_label(),
            location_label: labels.location(&record.key.location),
            service_type_name: labels.service_type(&record.service_type_id()).to_string(),
            attendance: record
                .attendance
                .as_ref()
                .map(|a| AttendanceBreakdown::new(&a.counts, a.displayed_total())),
            offering: record.offering.as_ref().map(|o| o.split().rounded()),
        }
    }
}

impl fmt::Display for ListingSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ListingSort::Date => "date",
            ListingSort::Attendance => "attendance",
            ListingSort::Offering => "offering",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{CenterId, ClusterId};
    use crate::domain::hierarchy::{Center, Cluster, Region};
    use crate::domain::submission::{
        collate, AttendanceSubmission, OfferingSubmission, SubmissionHeader,
    };

    struct Fixture {
        hierarchy: Hierarchy,
        service_types: Vec<ServiceType>,
        center: CenterId,
        cluster: ClusterId,
        sunday: ServiceTypeId,
        midweek: ServiceTypeId,
    }

    impl Fixture {
        fn labels(&self) -> ListingLabels<'_> {
            ListingLabels::new(&self.hierarchy, &self.service_types)
        }
    }

    fn fixture() -> Fixture {
        let region = Region::new("North");
        let cluster = Cluster::new("Riverside", Some(region.id));
        let center = Center::new("Hilltop Center", cluster.id);
        let sunday = ServiceType::new("Sunday Service");
        let midweek = ServiceType::new("Midweek Prayer");
        Fixture {
            center: center.id,
            cluster: cluster.id,
            sunday: sunday.id,
            midweek: midweek.id,
            hierarchy: Hierarchy::new(vec![region], vec![cluster], vec![center]),
            service_types: vec![sunday, midweek],
        }
    }

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn attendance(header: SubmissionHeader, adults: u32) -> AttendanceSubmission {
        AttendanceSubmission::new(
            header,
            AttendanceCounts {
                adult_brothers: adults,
                ..Default::default()
            },
        )
    }

    fn records(f: &Fixture) -> Vec<CollatedRecord> {
        collate(
            &[
                attendance(SubmissionHeader::for_center(f.center, f.sunday, date(3, 3)), 40),
                attendance(SubmissionHeader::for_center(f.center, f.midweek, date(3, 6)), 12),
                attendance(SubmissionHeader::for_cluster(f.cluster, f.sunday, date(4, 7)), 90),
            ],
            &[
                OfferingSubmission::new(
                    SubmissionHeader::for_center(f.center, f.sunday, date(3, 3)),
                    Decimal::from(250),
                ),
                OfferingSubmission::new(
                    SubmissionHeader::general(f.sunday, date(4, 14)),
                    Decimal::from(1000),
                ),
            ],
        )
    }

    #[test]
    fn labels_follow_level() {
        let f = fixture();
        let records = records(&f);
        let listing = CollatedListing::new(&records, f.labels());
        let page = listing.page(&ListingQuery::default()).unwrap();

        let labels: Vec<_> = page
            .rows
            .iter()
            .map(|r| (r.location_label.as_str(), r.level_label))
            .collect();
        assert_eq!(
            labels,
            vec![
                ("General Organization", "General Combined"),
                ("Riverside Cluster", "Cluster Combined"),
                ("Hilltop Center", "Center"),
                ("Hilltop Center", "Center"),
            ]
        );
    }

    #[test]
    fn unknown_ids_get_fallback_labels() {
        let f = fixture();
        let empty = Hierarchy::default();
        let records = records(&f);
        let listing = CollatedListing::new(&records, ListingLabels::new(&empty, &[]));
        let page = listing.page(&ListingQuery::default()).unwrap();

        assert!(page.rows.iter().all(|r| r.service_type_name == "Unknown Service"));
        assert!(page.rows.iter().any(|r| r.location_label == "Unknown Center"));
        assert!(page.rows.iter().any(|r| r.location_label == "Unknown Cluster"));
    }

    #[test]
    fn search_matches_date_or_service_name() {
        let f = fixture();
        let records = records(&f);
        let listing = CollatedListing::new(&records, f.labels());

        let by_name = ListingQuery {
            search: Some("MIDWEEK".into()),
            ..Default::default()
        };
        assert_eq!(listing.filtered(&by_name).len(), 1);

        let by_date = ListingQuery {
            search: Some("2024-04".into()),
            ..Default::default()
        };
        assert_eq!(listing.filtered(&by_date).len(), 2);

        let blank = ListingQuery {
            search: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(listing.filtered(&blank).len(), 4);
    }

    #[test]
    fn sort_by_attendance_uses_displayed_total() {
        let f = fixture();
        let records = records(&f);
        let listing = CollatedListing::new(&records, f.labels());
        let query = ListingQuery {
            sort: ListingSort::Attendance,
            ..Default::default()
        };
        let totals: Vec<_> = listing
            .filtered(&query)
            .iter()
            .map(|r| r.attendance_total().unwrap_or(0))
            .collect();
        assert_eq!(totals, vec![90, 40, 12, 0]);
    }

    #[test]
    fn sort_by_offering_ascending() {
        let f = fixture();
        let records = records(&f);
        let listing = CollatedListing::new(&records, f.labels());
        let query = ListingQuery {
            sort: ListingSort::Offering,
            direction: SortDirection::Ascending,
            ..Default::default()
        };
        let last = *listing.filtered(&query).last().unwrap();
        assert_eq!(last.offering_amount(), Some(Decimal::from(1000)));
    }

    #[test]
    fn pages_are_sliced_and_counted() {
        let f = fixture();
        let records = records(&f);
        let listing = CollatedListing::new(&records, f.labels());
        let query = ListingQuery {
            page: 2,
            page_size: 3,
            ..Default::default()
        };
        let page = listing.page(&query).unwrap();
        assert_eq!(page.total_rows, 4);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.rows.len(), 1);

        let beyond = listing
            .page(&ListingQuery {
                page: 9,
                ..Default::default()
            })
            .unwrap();
        assert!(beyond.rows.is_empty());
    }

    #[test]
    fn zero_page_is_rejected() {
        let f = fixture();
        let records = records(&f);
        let listing = CollatedListing::new(&records, f.labels());
        let query = ListingQuery {
            page: 0,
            ..Default::default()
        };
        assert!(listing.page(&query).is_err());
    }

    #[test]
    fn month_groups_preserve_order() {
        let f = fixture();
        let records = records(&f);
        let listing = CollatedListing::new(&records, f.labels());
        let page = listing
            .page(&ListingQuery {
                group_by_month: true,
                ..Default::default()
            })
            .unwrap();
        let groups = page.groups.unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].month, "2024-04");
        assert_eq!(groups[0].label, "April 2024");
        assert_eq!(groups[0].rows.len(), 2);
        assert_eq!(groups[1].month, "2024-03");
    }

    #[test]
    fn detail_shows_breakdown_and_split() {
        let f = fixture();
        let records = records(&f);
        let listing = CollatedListing::new(&records, f.labels());
        let joined = records
            .iter()
            .find(|r| r.attendance.is_some() && r.offering.is_some())
            .unwrap();
        let detail = listing.detail(joined);

        let attendance = detail.attendance.unwrap();
        assert_eq!(attendance.adults.brothers, 40);
        assert_eq!(attendance.total, 40);
        let offering = detail.offering.unwrap();
        assert_eq!(offering.amount_80, Decimal::from(200));
        assert_eq!(offering.amount_20, Decimal::from(50));
        assert_eq!(detail.service_type_name, "Sunday Service");
    }

    #[test]
    fn sort_parses_query_values() {
        assert_eq!("offering".parse::<ListingSort>().unwrap(), ListingSort::Offering);
        assert!("amount".parse::<ListingSort>().is_err());
    }
}
