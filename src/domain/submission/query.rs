//! Store-independent description of a submission fetch.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DateWindow, ServiceTypeId};
use crate::domain::scope::{LocationFilter, Role};

use super::{CollationKey, LocationKey, Submission, SubmissionLevel};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn is_ascending(&self) -> bool {
        matches!(self, SortDirection::Ascending)
    }
}

/// Filter, order and row cap for one submission collection.
///
/// Store adapters must reproduce [`SubmissionQuery::matches`] and the
/// ordering of [`SubmissionQuery::apply`] exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubmissionQuery {
    pub location: LocationFilter,
    pub level: Option<SubmissionLevel>,
    /// Inclusive lower bound on `service_date`.
    pub since: Option<NaiveDate>,
    /// Inclusive upper bound on `service_date`.
    pub until: Option<NaiveDate>,
    pub service_type: Option<ServiceTypeId>,
    /// Direction on `service_date`.
    pub order: SortDirection,
    pub limit: Option<u32>,
}

impl SubmissionQuery {
    pub fn new(location: LocationFilter) -> Self {
        Self {
            location,
            level: None,
            since: None,
            until: None,
            service_type: None,
            order: SortDirection::Descending,
            limit: None,
        }
    }

    /// Query for a caller's records within a date window.
    ///
    /// Center reps only ever see center-level rows, even rows for their
    /// own center's cluster.
    pub fn scoped(
        role: Role,
        location: LocationFilter,
        window: DateWindow,
        today: NaiveDate,
    ) -> Self {
        let query = Self::new(location).since(window.start_date(today));
        match role {
            Role::CenterRep => query.with_level(SubmissionLevel::Center),
            _ => query,
        }
    }

    pub fn with_level(mut self, level: SubmissionLevel) -> Self {
        self.level = Some(level);
        self
    }

    pub fn since(mut self, since: Option<NaiveDate>) -> Self {
        self.since = since;
        self
    }

    /// Narrows the query to the records of one service event.
    ///
    /// Returns `None` when no record under `key` can match, for example a
    /// cluster key on a center-only query or a date before the window.
    /// The row cap is lifted.
    pub fn for_key(mut self, key: &CollationKey) -> Option<Self> {
        if self.level.is_some_and(|level| level != key.level)
            || self.since.is_some_and(|since| key.service_date < since)
            || self.until.is_some_and(|until| key.service_date > until)
        {
            return None;
        }
        let location = match key.location {
            LocationKey::Center(id) if self.location.matches(Some(&id), None) => {
                LocationFilter::centers([id])
            }
            LocationKey::Cluster(id) if self.location.matches(None, Some(&id)) => {
                LocationFilter::clusters([id])
            }
            LocationKey::General if self.location.matches(None, None) => self.location.clone(),
            _ => return None,
        };
        self.location = location;
        self.level = Some(key.level);
        self.since = Some(key.service_date);
        self.until = Some(key.service_date);
        self.service_type = Some(key.service_type_id);
        self.limit = None;
        Some(self)
    }

    pub fn ordered(mut self, order: SortDirection) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// True when the query can be answered without touching the store.
    pub fn is_trivially_empty(&self) -> bool {
        self.location.matches_nothing() || self.limit == Some(0)
    }

    pub fn matches<S: Submission>(&self, record: &S) -> bool {
        let header = record.header();
        if let Some(level) = self.level {
            if header.submission_level != level {
                return false;
            }
        }
        if let Some(since) = self.since {
            if header.service_date < since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if header.service_date > until {
                return false;
            }
        }
        if let Some(service_type) = self.service_type {
            if header.service_type_id != service_type {
                return false;
            }
        }
        self.location
            .matches(header.center_id.as_ref(), header.cluster_id.as_ref())
    }

    /// Filters, orders and caps an in-memory collection.
    ///
    /// Ties on `service_date` are ordered by `created_at` then id in the
    /// same direction so results are deterministic.
    pub fn apply<S: Submission + Clone>(&self, records: &[S]) -> Vec<S> {
        let mut matched: Vec<S> = records.iter().filter(|r| self.matches(*r)).cloned().collect();
        matched.sort_by(|a, b| {
            let (a, b) = (a.header(), b.header());
            let ordering = a
                .service_date
                .cmp(&b.service_date)
                .then_with(|| a.created_at.cmp(&b.created_at))
                .then_with(|| a.id.cmp(&b.id));
            if self.order.is_ascending() {
                ordering
            } else {
                ordering.reverse()
            }
        });
        if let Some(limit) = self.limit {
            matched.truncate(limit as usize);
        }
        matched
    }
}
