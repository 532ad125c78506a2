//! GetDashboardSummaryHandler - Query handler for headline totals.
//!
//! Totals cover every record in the caller's scope and window; nothing
//! is capped here.

use std::sync::Arc;

use crate::domain::dashboard::DashboardSummary;
use crate::ports::Clock;

use super::{DashboardError, DashboardQuery, FetchScope, ScopedReader};

pub type GetDashboardSummaryResult = DashboardSummary;

pub struct GetDashboardSummaryHandler {
    reader: ScopedReader,
    clock: Arc<dyn Clock>,
}

impl GetDashboardSummaryHandler {
    pub fn new(reader: ScopedReader, clock: Arc<dyn Clock>) -> Self {
        Self { reader, clock }
    }

    #[tracing::instrument(skip_all, fields(role = %query.user.role, window = %query.window))]
    pub async fn handle(
        &self,
        query: DashboardQuery,
    ) -> Result<GetDashboardSummaryResult, DashboardError> {
        let today = self.clock.today();
        let resolved = self.reader.resolve(&query.user).await?;
        let params = FetchScope {
            window: query.window,
            location: query.location.as_ref(),
            today,
            limit: None,
        };

        let (records, counts) = tokio::try_join!(
            self.reader.fetch_scoped(&resolved, params),
            self.reader.organization_counts()
        )?;

        Ok(DashboardSummary::aggregate(
            &records.attendance,
            &records.offerings,
            counts,
            query.window,
            today,
        ))
    }
}
