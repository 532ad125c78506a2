//! Submission collation.
//!
//! Attendance and offering records are stored independently. Two records
//! describe the same service event when their date, level, location and
//! service type all match; collation joins them into one display unit.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{
    CenterId, ClusterId, ServiceTypeId, SubmissionId, ValidationError,
};

use super::{
    AttendanceSubmission, OfferingSubmission, Submission, SubmissionHeader, SubmissionLevel,
};

/// Location component of a collation key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LocationKey {
    Center(CenterId),
    Cluster(ClusterId),
    General,
}

impl LocationKey {
    fn of(header: &SubmissionHeader) -> Self {
        match (header.center_id, header.cluster_id) {
            (Some(center), _) => LocationKey::Center(center),
            (None, Some(cluster)) => LocationKey::Cluster(cluster),
            (None, None) => LocationKey::General,
        }
    }
}

impl fmt::Display for LocationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationKey::Center(id) => write!(f, "{}", id),
            LocationKey::Cluster(id) => write!(f, "{}", id),
            LocationKey::General => f.write_str("general"),
        }
    }
}

/// Join key `date_level_location_servicetype`.
///
/// The level is part of the key so a center-level and a cluster-level
/// submission for the same date and service never merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollationKey {
    pub service_date: NaiveDate,
    pub level: SubmissionLevel,
    pub location: LocationKey,
    pub service_type_id: ServiceTypeId,
}

impl CollationKey {
    pub fn of<S: Submission>(record: &S) -> Self {
        let header = record.header();
        Self {
            service_date: header.service_date,
            level: header.submission_level,
            location: LocationKey::of(header),
            service_type_id: header.service_type_id,
        }
    }
}

impl fmt::Display for CollationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}_{}",
            self.service_date.format("%Y-%m-%d"),
            self.level,
            self.location,
            self.service_type_id
        )
    }
}

impl FromStr for CollationKey {
    type Err = ValidationError;

    /// Parses the `Display` form back into a key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid =
            || ValidationError::invalid_format("key", "expected date_level_location_servicetype");
        let parts: Vec<&str> = s.split('_').collect();
        let [date, level, location, service_type] = parts[..] else {
            return Err(invalid());
        };

        let service_date =
            NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| invalid())?;
        let level: SubmissionLevel = level.parse()?;
        let location = match level {
            SubmissionLevel::Center => {
                LocationKey::Center(location.parse().map_err(|_| invalid())?)
            }
            SubmissionLevel::Cluster => {
                LocationKey::Cluster(location.parse().map_err(|_| invalid())?)
            }
            SubmissionLevel::General if location == "general" => LocationKey::General,
            SubmissionLevel::General => return Err(invalid()),
        };
        Ok(Self {
            service_date,
            level,
            location,
            service_type_id: service_type.parse().map_err(|_| invalid())?,
        })
    }
}

impl Serialize for CollationKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One service event with whichever sides were submitted.
///
/// A missing side is a valid state, rendered as a dash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollatedRecord {
    pub key: CollationKey,
    pub attendance: Option<AttendanceSubmission>,
    pub offering: Option<OfferingSubmission>,
}

impl CollatedRecord {
    fn empty(key: CollationKey) -> Self {
        Self {
            key,
            attendance: None,
            offering: None,
        }
    }

    pub fn service_date(&self) -> NaiveDate {
        self.key.service_date
    }

    pub fn level(&self) -> SubmissionLevel {
        self.key.level
    }

    pub fn service_type_id(&self) -> ServiceTypeId {
        self.key.service_type_id
    }

    pub fn center_id(&self) -> Option<CenterId> {
        match self.key.location {
            LocationKey::Center(id) => Some(id),
            _ => None,
        }
    }

    pub fn cluster_id(&self) -> Option<ClusterId> {
        match self.key.location {
            LocationKey::Cluster(id) => Some(id),
            _ => None,
        }
    }

    /// Self-healed headcount, if attendance was submitted.
    pub fn attendance_total(&self) -> Option<u64> {
        self.attendance.as_ref().map(AttendanceSubmission::displayed_total)
    }

    pub fn offering_amount(&self) -> Option<Decimal> {
        self.offering.as_ref().map(|o| o.amount_100)
    }
}

/// Keeps the most recently created record per key; ties go to the larger id.
fn newer<S: Submission>(current: &S, candidate: &S) -> bool {
    let rank = |s: &S| -> (DateTime<Utc>, SubmissionId) {
        let h = s.header();
        (h.created_at, h.id)
    };
    rank(candidate) > rank(current)
}

/// Joins attendance and offering records on their collation key.
///
/// The output is ordered by service date (newest first), then level,
/// location and service type. Running it again on the same input yields
/// the same records; repeated input rows never duplicate an event.
pub fn collate(
    attendance: &[AttendanceSubmission],
    offerings: &[OfferingSubmission],
) -> Vec<CollatedRecord> {
    let mut joined: BTreeMap<CollationKey, CollatedRecord> = BTreeMap::new();

    for record in attendance {
        let key = CollationKey::of(record);
        let entry = joined.entry(key).or_insert_with(|| CollatedRecord::empty(key));
        match &entry.attendance {
            Some(existing) if !newer(existing, record) => {}
            _ => entry.attendance = Some(record.clone()),
        }
    }

    for record in offerings {
        let key = CollationKey::of(record);
        let entry = joined.entry(key).or_insert_with(|| CollatedRecord::empty(key));
        match &entry.offering {
            Some(existing) if !newer(existing, record) => {}
            _ => entry.offering = Some(record.clone()),
        }
    }

    let mut records: Vec<CollatedRecord> = joined.into_values().collect();
    records.sort_by(|a, b| {
        b.key
            .service_date
            .cmp(&a.key.service_date)
            .then_with(|| a.key.cmp(&b.key))
    });
    records
}
