//! Scoping shape shared by attendance and offering submissions.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{CenterId, ClusterId, ServiceTypeId, SubmissionId, ValidationError};

/// Granularity at which a submission was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionLevel {
    Center,
    Cluster,
    General,
}

impl SubmissionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionLevel::Center => "center",
            SubmissionLevel::Cluster => "cluster",
            SubmissionLevel::General => "general",
        }
    }

    /// Label shown next to a location in listings.
    pub fn display_label(&self) -> &'static str {
        match self {
            SubmissionLevel::Center => "Center",
            SubmissionLevel::Cluster => "Cluster Combined",
            SubmissionLevel::General => "General Combined",
        }
    }
}

impl fmt::Display for SubmissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmissionLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "center" => Ok(SubmissionLevel::Center),
            "cluster" => Ok(SubmissionLevel::Cluster),
            "general" => Ok(SubmissionLevel::General),
            other => Err(ValidationError::invalid_format(
                "submission_level",
                format!("unknown level '{}'", other),
            )),
        }
    }
}

/// Fields every submission carries, whatever its metrics.
///
/// Invariant: `Center` level sets only `center_id`, `Cluster` level only
/// `cluster_id`, `General` neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionHeader {
    pub id: SubmissionId,
    pub submission_level: SubmissionLevel,
    pub center_id: Option<CenterId>,
    pub cluster_id: Option<ClusterId>,
    pub service_type_id: ServiceTypeId,
    pub service_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl SubmissionHeader {
    pub fn for_center(
        center_id: CenterId,
        service_type_id: ServiceTypeId,
        service_date: NaiveDate,
    ) -> Self {
        Self {
            id: SubmissionId::new(),
            submission_level: SubmissionLevel::Center,
            center_id: Some(center_id),
            cluster_id: None,
            service_type_id,
            service_date,
            created_at: Utc::now(),
        }
    }

    pub fn for_cluster(
        cluster_id: ClusterId,
        service_type_id: ServiceTypeId,
        service_date: NaiveDate,
    ) -> Self {
        Self {
            id: SubmissionId::new(),
            submission_level: SubmissionLevel::Cluster,
            center_id: None,
            cluster_id: Some(cluster_id),
            service_type_id,
            service_date,
            created_at: Utc::now(),
        }
    }

    pub fn general(service_type_id: ServiceTypeId, service_date: NaiveDate) -> Self {
        Self {
            id: SubmissionId::new(),
            submission_level: SubmissionLevel::General,
            center_id: None,
            cluster_id: None,
            service_type_id,
            service_date,
            created_at: Utc::now(),
        }
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Checks the level/location invariant.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let consistent = match self.submission_level {
            SubmissionLevel::Center => self.center_id.is_some() && self.cluster_id.is_none(),
            SubmissionLevel::Cluster => self.cluster_id.is_some() && self.center_id.is_none(),
            SubmissionLevel::General => self.center_id.is_none() && self.cluster_id.is_none(),
        };
        if consistent {
            Ok(())
        } else {
            Err(ValidationError::invalid_format(
                "submission_level",
                format!(
                    "{} submission has center_id={:?} cluster_id={:?}",
                    self.submission_level, self.center_id, self.cluster_id
                ),
            ))
        }
    }
}

/// Anything stored with a [`SubmissionHeader`].
pub trait Submission {
    fn header(&self) -> &SubmissionHeader;
}
