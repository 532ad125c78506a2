//! PostgreSQL implementation of RecordStore.
//!
//! Submission queries are assembled with `sqlx::QueryBuilder` so the
//! location filter, level, window and row cap all travel as bind
//! parameters. The cluster-or-center disjunction becomes
//! `(cluster_id = ANY($n) OR center_id = ANY($m))`; a filter with no ids
//! becomes `FALSE`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::foundation::{CenterId, ClusterId, RegionId, ServiceTypeId, SubmissionId};
use crate::domain::hierarchy::{Center, Cluster, Region, ServiceType};
use crate::domain::scope::LocationFilter;
use crate::domain::submission::{
    AttendanceCounts, AttendanceSubmission, OfferingSubmission, SubmissionHeader,
    SubmissionQuery,
};
use crate::ports::{CenterFilter, ClusterFilter, RecordStore, StoreError};

const HEADER_COLUMNS: &str =
    "id, submission_level, center_id, cluster_id, service_type_id, service_date, created_at";

const ATTENDANCE_COLUMNS: &str = "adult_brothers, adult_sisters, youth_brothers, youth_sisters, \
     children_brothers, children_sisters, visitors_brothers, visitors_sisters, grand_total";

/// PostgreSQL implementation of RecordStore.
#[derive(Clone)]
pub struct PostgresRecordStore {
    pool: PgPool,
}

impl PostgresRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RegionRow {
    id: Uuid,
    name: String,
}

#[derive(Debug, sqlx::FromRow)]
struct ClusterRow {
    id: Uuid,
    name: String,
    region_id: Option<Uuid>,
}

#[derive(Debug, sqlx::FromRow)]
struct CenterRow {
    id: Uuid,
    name: String,
    cluster_id: Uuid,
}

#[derive(Debug, sqlx::FromRow)]
struct ServiceTypeRow {
    id: Uuid,
    name: String,
}

#[derive(Debug, sqlx::FromRow)]
struct AttendanceRow {
    id: Uuid,
    submission_level: String,
    center_id: Option<Uuid>,
    cluster_id: Option<Uuid>,
    service_type_id: Uuid,
    service_date: NaiveDate,
    created_at: DateTime<Utc>,
    adult_brothers: i32,
    adult_sisters: i32,
    youth_brothers: i32,
    youth_sisters: i32,
    children_brothers: i32,
    children_sisters: i32,
    visitors_brothers: i32,
    visitors_sisters: i32,
    grand_total: i32,
}

#[derive(Debug, sqlx::FromRow)]
struct OfferingRow {
    id: Uuid,
    submission_level: String,
    center_id: Option<Uuid>,
    cluster_id: Option<Uuid>,
    service_type_id: Uuid,
    service_date: NaiveDate,
    created_at: DateTime<Utc>,
    amount_100: Decimal,
}

fn malformed(collection: &'static str, reason: impl Into<String>) -> StoreError {
    StoreError::MalformedRow {
        collection,
        reason: reason.into(),
    }
}

#[allow(clippy::too_many_arguments)]
fn build_header(
    collection: &'static str,
    id: Uuid,
    level: &str,
    center_id: Option<Uuid>,
    cluster_id: Option<Uuid>,
    service_type_id: Uuid,
    service_date: NaiveDate,
    created_at: DateTime<Utc>,
) -> Result<SubmissionHeader, StoreError> {
    let header = SubmissionHeader {
        id: SubmissionId::from_uuid(id),
        submission_level: level.parse().map_err(|e| malformed(collection, format!("{}", e)))?,
        center_id: center_id.map(CenterId::from_uuid),
        cluster_id: cluster_id.map(ClusterId::from_uuid),
        service_type_id: ServiceTypeId::from_uuid(service_type_id),
        service_date,
        created_at,
    };
    header
        .validate()
        .map_err(|e| malformed(collection, format!("row {}: {}", id, e)))?;
    Ok(header)
}

fn count(field: &'static str, value: i32) -> Result<u32, StoreError> {
    u32::try_from(value)
        .map_err(|_| malformed("attendance", format!("{} is negative: {}", field, value)))
}

impl TryFrom<AttendanceRow> for AttendanceSubmission {
    type Error = StoreError;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        let header = build_header(
            "attendance",
            row.id,
            &row.submission_level,
            row.center_id,
            row.cluster_id,
            row.service_type_id,
            row.service_date,
            row.created_at,
        )?;
        let counts = AttendanceCounts {
            adult_brothers: count("adult_brothers", row.adult_brothers)?,
            adult_sisters: count("adult_sisters", row.adult_sisters)?,
            youth_brothers: count("youth_brothers", row.youth_brothers)?,
            youth_sisters: count("youth_sisters", row.youth_sisters)?,
            children_brothers: count("children_brothers", row.children_brothers)?,
            children_sisters: count("children_sisters", row.children_sisters)?,
            visitors_brothers: count("visitors_brothers", row.visitors_brothers)?,
            visitors_sisters: count("visitors_sisters", row.visitors_sisters)?,
        };
        // Stored totals are kept as-is, even when stale.
        Ok(AttendanceSubmission::new(header, counts)
            .with_grand_total(count("grand_total", row.grand_total)?))
    }
}

impl TryFrom<OfferingRow> for OfferingSubmission {
    type Error = StoreError;

    fn try_from(row: OfferingRow) -> Result<Self, Self::Error> {
        let header = build_header(
            "offerings",
            row.id,
            &row.submission_level,
            row.center_id,
            row.cluster_id,
            row.service_type_id,
            row.service_date,
            row.created_at,
        )?;
        if row.amount_100.is_sign_negative() {
            return Err(malformed("offerings", format!("negative amount_100 on row {}", row.id)));
        }
        Ok(OfferingSubmission::new(header, row.amount_100))
    }
}

fn uuids<'a, T: 'a>(ids: impl IntoIterator<Item = &'a T>, as_uuid: fn(&T) -> &Uuid) -> Vec<Uuid> {
    ids.into_iter().map(|id| *as_uuid(id)).collect()
}

/// Appends ` AND <location predicate>` for `filter`.
fn push_location(builder: &mut QueryBuilder<'_, Postgres>, filter: &LocationFilter) {
    if filter.matches_nothing() {
        builder.push(" AND FALSE");
        return;
    }
    match filter {
        LocationFilter::Unrestricted => {}
        LocationFilter::ByCenterSet { centers } => {
            builder.push(" AND center_id = ANY(");
            builder.push_bind(uuids(centers, CenterId::as_uuid));
            builder.push(")");
        }
        LocationFilter::ByClusterSet { clusters } => {
            builder.push(" AND cluster_id = ANY(");
            builder.push_bind(uuids(clusters, ClusterId::as_uuid));
            builder.push(")");
        }
        LocationFilter::Either { centers, clusters } => {
            builder.push(" AND (");
            let mut first = true;
            if !clusters.is_empty() {
                builder.push("cluster_id = ANY(");
                builder.push_bind(uuids(clusters, ClusterId::as_uuid));
                builder.push(")");
                first = false;
            }
            if !centers.is_empty() {
                if !first {
                    builder.push(" OR ");
                }
                builder.push("center_id = ANY(");
                builder.push_bind(uuids(centers, CenterId::as_uuid));
                builder.push(")");
            }
            builder.push(")");
        }
    }
}

/// Full SELECT for one submission table.
fn submission_select<'a>(
    table: &str,
    metric_columns: &str,
    query: &SubmissionQuery,
) -> QueryBuilder<'a, Postgres> {
    let mut builder = QueryBuilder::new(format!(
        "SELECT {}, {} FROM {} WHERE TRUE",
        HEADER_COLUMNS, metric_columns, table
    ));

    push_location(&mut builder, &query.location);

    if let Some(level) = query.level {
        builder.push(" AND submission_level = ");
        builder.push_bind(level.as_str());
    }
    if let Some(since) = query.since {
        builder.push(" AND service_date >= ");
        builder.push_bind(since);
    }
    if let Some(until) = query.until {
        builder.push(" AND service_date <= ");
        builder.push_bind(until);
    }
    if let Some(service_type) = query.service_type {
        builder.push(" AND service_type_id = ");
        builder.push_bind(*service_type.as_uuid());
    }

    let direction = if query.order.is_ascending() { "ASC" } else { "DESC" };
    builder.push(format!(
        " ORDER BY service_date {d}, created_at {d}, id {d}",
        d = direction
    ));

    if let Some(limit) = query.limit {
        builder.push(" LIMIT ");
        builder.push_bind(i64::from(limit));
    }
    builder
}

fn cluster_select<'a>(filter: &ClusterFilter) -> QueryBuilder<'a, Postgres> {
    let mut builder = QueryBuilder::new("SELECT id, name, region_id FROM clusters");
    match filter {
        ClusterFilter::All => {}
        ClusterFilter::InRegion(region_id) => {
            builder.push(" WHERE region_id = ");
            builder.push_bind(*region_id.as_uuid());
        }
        ClusterFilter::Ids(ids) => {
            builder.push(" WHERE id = ANY(");
            builder.push_bind(uuids(ids, ClusterId::as_uuid));
            builder.push(")");
        }
    }
    builder.push(" ORDER BY name");
    builder
}

fn center_select<'a>(filter: &CenterFilter) -> QueryBuilder<'a, Postgres> {
    let mut builder = QueryBuilder::new("SELECT id, name, cluster_id FROM centers");
    match filter {
        CenterFilter::All => {}
        CenterFilter::InClusters(clusters) => {
            builder.push(" WHERE cluster_id = ANY(");
            builder.push_bind(uuids(clusters, ClusterId::as_uuid));
            builder.push(")");
        }
        CenterFilter::Ids(ids) => {
            builder.push(" WHERE id = ANY(");
            builder.push_bind(uuids(ids, CenterId::as_uuid));
            builder.push(")");
        }
    }
    builder.push(" ORDER BY name");
    builder
}

fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |e| {
        tracing::warn!("{} query failed: {}", context, e);
        StoreError::from(e)
    }
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    async fn regions(&self) -> Result<Vec<Region>, StoreError> {
        let rows: Vec<RegionRow> = sqlx::query_as("SELECT id, name FROM regions ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("regions"))?;

        Ok(rows
            .into_iter()
            .map(|r| Region {
                id: RegionId::from_uuid(r.id),
                name: r.name,
            })
            .collect())
    }

    async fn clusters(&self, filter: &ClusterFilter) -> Result<Vec<Cluster>, StoreError> {
        if filter.is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<ClusterRow> = cluster_select(filter)
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("clusters"))?;

        Ok(rows
            .into_iter()
            .map(|r| Cluster {
                id: ClusterId::from_uuid(r.id),
                name: r.name,
                region_id: r.region_id.map(RegionId::from_uuid),
            })
            .collect())
    }

    async fn centers(&self, filter: &CenterFilter) -> Result<Vec<Center>, StoreError> {
        if filter.is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<CenterRow> = center_select(filter)
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("centers"))?;

        Ok(rows
            .into_iter()
            .map(|r| Center {
                id: CenterId::from_uuid(r.id),
                name: r.name,
                cluster_id: ClusterId::from_uuid(r.cluster_id),
            })
            .collect())
    }

    async fn service_types(&self) -> Result<Vec<ServiceType>, StoreError> {
        let rows: Vec<ServiceTypeRow> =
            sqlx::query_as("SELECT id, name FROM service_types ORDER BY name")
                .fetch_all(&self.pool)
                .await
                .map_err(db_error("service_types"))?;

        Ok(rows
            .into_iter()
            .map(|r| ServiceType {
                id: ServiceTypeId::from_uuid(r.id),
                name: r.name,
            })
            .collect())
    }

    async fn count_clusters(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clusters")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("count_clusters"))?;
        Ok(count.max(0) as u64)
    }

    async fn count_centers(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM centers")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("count_centers"))?;
        Ok(count.max(0) as u64)
    }

    async fn attendance(
        &self,
        query: &SubmissionQuery,
    ) -> Result<Vec<AttendanceSubmission>, StoreError> {
        if query.is_trivially_empty() {
            return Ok(Vec::new());
        }
        let mut builder = submission_select("attendance_submissions", ATTENDANCE_COLUMNS, query);
        tracing::debug!("attendance query: {}", builder.sql());

        let rows: Vec<AttendanceRow> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("attendance"))?;
        rows.into_iter().map(AttendanceSubmission::try_from).collect()
    }

    async fn offerings(
        &self,
        query: &SubmissionQuery,
    ) -> Result<Vec<OfferingSubmission>, StoreError> {
        if query.is_trivially_empty() {
            return Ok(Vec::new());
        }
        let mut builder = submission_select("offering_submissions", "amount_100", query);
        tracing::debug!("offerings query: {}", builder.sql());

        let rows: Vec<OfferingRow> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("offerings"))?;
        rows.into_iter().map(OfferingSubmission::try_from).collect()
    }
}
