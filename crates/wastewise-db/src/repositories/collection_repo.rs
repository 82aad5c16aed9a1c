//! Collection record repository implementation
//!
//! Aggregates over `collection_records` for the waste and efficiency
//! reports, and the joined export.

use crate::sql::{bucket_columns, db_error, decode, push_window};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, instrument};
use uuid::Uuid;
use wastewise_core::{
    aggregates::{
        BinRef, CollectionExport, CollectorPerformance, RouteRef, WasteTrendPoint, WasteTypeTotal,
    },
    filter::CollectionFilter,
    models::{UserRef, WasteType},
    period::{BucketKey, DateWindow, TimeBucket},
    traits::CollectionRepository,
    AppError, AppResult,
};

/// PostgreSQL implementation of CollectionRepository
pub struct PgCollectionRepository {
    pool: PgPool,
}

impl PgCollectionRepository {
    /// Create a new collection record repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const EXPORT_SELECT: &str = r#"
    SELECT
        c.id, c.collection_date, c.waste_type, c.waste_weight,
        b.id AS bin_ref_id, b.bin_id AS bin_code, b.waste_type AS bin_waste_type, b.address AS bin_address,
        col.id AS collector_id, col.name AS collector_name, col.email AS collector_email,
        res.id AS resident_id, res.name AS resident_name, res.email AS resident_email,
        r.id AS route_ref_id, r.name AS route_name, r.area AS route_area
    FROM collection_records c
    LEFT JOIN bins b ON b.id = c.bin
    LEFT JOIN users col ON col.id = c.collector
    LEFT JOIN users res ON res.id = c.resident
    LEFT JOIN routes r ON r.id = c.route
    WHERE TRUE
"#;

#[async_trait]
impl CollectionRepository for PgCollectionRepository {
    #[instrument(skip(self))]
    async fn count(&self, filter: &CollectionFilter) -> AppResult<i64> {
        let mut qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM collection_records WHERE TRUE");
        push_window(&mut qb, "collection_date", &filter.collected);

        qb.build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("count collection records"))
    }

    #[instrument(skip(self))]
    async fn totals_by_waste_type(
        &self,
        filter: &CollectionFilter,
    ) -> AppResult<Vec<WasteTypeTotal>> {
        debug!("Grouping collection records by waste type");

        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT waste_type, COUNT(*) AS count, COALESCE(SUM(waste_weight), 0)::float8 AS total_weight \
             FROM collection_records WHERE TRUE",
        );
        push_window(&mut qb, "collection_date", &filter.collected);
        qb.push(" GROUP BY waste_type");

        let rows = qb
            .build_query_as::<WasteTypeRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("group collection records by waste type"))?;

        rows.into_iter()
            .map(|row| {
                Ok(WasteTypeTotal {
                    waste_type: decode(&row.waste_type, WasteType::from_str, "waste_type")?,
                    count: row.count,
                    total_weight: row.total_weight,
                })
            })
            .collect()
    }

    #[instrument(skip(self))]
    async fn totals_by_bucket(
        &self,
        filter: &CollectionFilter,
        bucket: TimeBucket,
    ) -> AppResult<Vec<WasteTrendPoint>> {
        debug!("Grouping collection records by {:?}", bucket);

        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(bucket_columns(bucket, "collection_date"));
        qb.push(
            ", COUNT(*) AS count, COALESCE(SUM(waste_weight), 0)::float8 AS total_weight \
             FROM collection_records WHERE TRUE",
        );
        push_window(&mut qb, "collection_date", &filter.collected);
        qb.push(" GROUP BY 1, 2, 3");

        let rows = qb
            .build_query_as::<BucketRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("group collection records by period"))?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    #[instrument(skip(self))]
    async fn collector_totals(
        &self,
        filter: &CollectionFilter,
    ) -> AppResult<Vec<CollectorPerformance>> {
        debug!("Aggregating collector performance");

        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT c.collector AS collector_id, COUNT(*) AS collections_completed, \
             COALESCE(SUM(c.waste_weight), 0)::float8 AS total_weight, \
             COALESCE(AVG(c.waste_weight), 0)::float8 AS avg_weight, \
             u.name AS collector_name, u.email AS collector_email \
             FROM collection_records c LEFT JOIN users u ON u.id = c.collector \
             WHERE c.collector IS NOT NULL",
        );
        push_window(&mut qb, "c.collection_date", &filter.collected);
        qb.push(" GROUP BY c.collector, u.name, u.email");

        let rows = qb
            .build_query_as::<CollectorRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("aggregate collector performance"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn export(&self, window: &DateWindow) -> AppResult<Vec<CollectionExport>> {
        debug!("Exporting collection records");

        let mut qb = QueryBuilder::<Postgres>::new(EXPORT_SELECT);
        push_window(&mut qb, "c.collection_date", window);
        qb.push(" ORDER BY c.collection_date DESC, c.id");

        let rows = qb
            .build_query_as::<ExportRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("export collection records"))?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct WasteTypeRow {
    waste_type: String,
    count: i64,
    total_weight: f64,
}

#[derive(Debug, sqlx::FromRow)]
struct BucketRow {
    year: i32,
    month: i32,
    day: Option<i32>,
    count: i64,
    total_weight: f64,
}

impl TryFrom<BucketRow> for WasteTrendPoint {
    type Error = AppError;

    fn try_from(row: BucketRow) -> Result<Self, Self::Error> {
        let month = u32::try_from(row.month)
            .map_err(|_| AppError::Database(format!("Unexpected month value: {}", row.month)))?;
        let day = row
            .day
            .map(u32::try_from)
            .transpose()
            .map_err(|_| AppError::Database("Unexpected day value".to_string()))?;

        Ok(Self {
            bucket: BucketKey {
                year: row.year,
                month,
                day,
            },
            count: row.count,
            total_weight: row.total_weight,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CollectorRow {
    collector_id: Uuid,
    collections_completed: i64,
    total_weight: f64,
    avg_weight: f64,
    collector_name: Option<String>,
    collector_email: Option<String>,
}

impl From<CollectorRow> for CollectorPerformance {
    fn from(row: CollectorRow) -> Self {
        Self {
            collector_id: row.collector_id,
            collections_completed: row.collections_completed,
            total_weight: row.total_weight,
            avg_weight: row.avg_weight,
            collector_name: row.collector_name,
            collector_email: row.collector_email,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ExportRow {
    id: Uuid,
    collection_date: DateTime<Utc>,
    waste_type: String,
    waste_weight: f64,
    bin_ref_id: Option<Uuid>,
    bin_code: Option<String>,
    bin_waste_type: Option<String>,
    bin_address: Option<String>,
    collector_id: Option<Uuid>,
    collector_name: Option<String>,
    collector_email: Option<String>,
    resident_id: Option<Uuid>,
    resident_name: Option<String>,
    resident_email: Option<String>,
    route_ref_id: Option<Uuid>,
    route_name: Option<String>,
    route_area: Option<String>,
}

/// Rebuild a user reference from the columns of a LEFT JOIN
pub(crate) fn user_ref(
    id: Option<Uuid>,
    name: Option<String>,
    email: Option<String>,
) -> Option<UserRef> {
    id.map(|id| UserRef {
        id,
        name: name.unwrap_or_default(),
        email: email.unwrap_or_default(),
    })
}

impl TryFrom<ExportRow> for CollectionExport {
    type Error = AppError;

    fn try_from(row: ExportRow) -> Result<Self, Self::Error> {
        let bin = match (row.bin_ref_id, row.bin_waste_type) {
            (Some(id), Some(waste_type)) => Some(BinRef {
                id,
                bin_id: row.bin_code.unwrap_or_default(),
                waste_type: decode(&waste_type, WasteType::from_str, "bins.waste_type")?,
                address: row.bin_address.unwrap_or_default(),
            }),
            _ => None,
        };
        let route = row.route_ref_id.map(|id| RouteRef {
            id,
            name: row.route_name.unwrap_or_default(),
            area: row.route_area.unwrap_or_default(),
        });

        Ok(Self {
            id: row.id,
            collection_date: row.collection_date,
            waste_type: decode(&row.waste_type, WasteType::from_str, "waste_type")?,
            waste_weight: row.waste_weight,
            bin,
            collector: user_ref(row.collector_id, row.collector_name, row.collector_email),
            resident: user_ref(row.resident_id, row.resident_name, row.resident_email),
            route,
        })
    }
}
