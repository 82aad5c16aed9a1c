//! Bin repository implementation

use crate::sql::{db_error, decode};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, instrument};
use wastewise_core::{
    aggregates::{BinUtilization, LocationBins},
    filter::BinFilter,
    models::WasteType,
    traits::BinRepository,
    AppResult,
};

/// PostgreSQL implementation of BinRepository
pub struct PgBinRepository {
    pool: PgPool,
}

impl PgBinRepository {
    /// Create a new bin repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &BinFilter) {
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(min) = filter.min_fill_level {
        qb.push(" AND fill_level >= ").push_bind(min);
    }
    if let Some(owner) = filter.created_by {
        qb.push(" AND created_by = ").push_bind(owner);
    }
}

#[async_trait]
impl BinRepository for PgBinRepository {
    #[instrument(skip(self))]
    async fn count(&self, filter: &BinFilter) -> AppResult<i64> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM bins WHERE TRUE");
        push_filter(&mut qb, filter);

        qb.build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("count bins"))
    }

    #[instrument(skip(self))]
    async fn utilization_by_waste_type(&self) -> AppResult<Vec<BinUtilization>> {
        debug!("Grouping bins by waste type");

        let rows = sqlx::query_as::<Postgres, UtilizationRow>(
            r#"
            SELECT waste_type, AVG(fill_level)::float8 AS avg_fill_level, COUNT(*) AS count
            FROM bins
            GROUP BY waste_type
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("group bins by waste type"))?;

        rows.into_iter()
            .map(|row| {
                Ok(BinUtilization {
                    waste_type: decode(&row.waste_type, WasteType::from_str, "waste_type")?,
                    avg_fill_level: row.avg_fill_level.unwrap_or(0.0),
                    count: row.count,
                })
            })
            .collect()
    }

    #[instrument(skip(self))]
    async fn group_by_location(&self) -> AppResult<Vec<LocationBins>> {
        debug!("Grouping bins by address");

        let rows = sqlx::query_as::<Postgres, LocationRow>(
            r#"
            SELECT address, COUNT(*) AS bin_count, AVG(fill_level)::float8 AS avg_fill_level
            FROM bins
            GROUP BY address
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("group bins by location"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UtilizationRow {
    waste_type: String,
    avg_fill_level: Option<f64>,
    count: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct LocationRow {
    address: String,
    bin_count: i64,
    avg_fill_level: Option<f64>,
}

impl From<LocationRow> for LocationBins {
    fn from(row: LocationRow) -> Self {
        Self {
            address: row.address,
            bin_count: row.bin_count,
            avg_fill_level: row.avg_fill_level.unwrap_or(0.0),
        }
    }
}
