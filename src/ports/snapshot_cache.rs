//! Read-through cache port for dashboard snapshots.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::dashboard::DashboardSnapshot;
use crate::domain::foundation::DateWindow;
use crate::domain::scope::{LocationOverride, UserScope};

/// Everything a snapshot depends on.
///
/// `today` is part of the key so entries never outlive the day their
/// window boundaries were computed for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnapshotKey {
    pub user: UserScope,
    pub window: DateWindow,
    pub location: Option<LocationOverride>,
    pub today: NaiveDate,
}

/// Cache of fully computed snapshots.
///
/// A miss is `None`; implementations never fail a request, so there is no
/// error type. Stored values must be returned unchanged.
#[async_trait]
pub trait SnapshotCache: Send + Sync {
    async fn get(&self, key: &SnapshotKey) -> Option<DashboardSnapshot>;

    async fn put(&self, key: SnapshotKey, snapshot: DashboardSnapshot);
}
