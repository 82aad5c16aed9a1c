//! Route repository implementation

use crate::sql::db_error;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, instrument};
use wastewise_core::{
    aggregates::{AreaRoutes, RouteEfficiency},
    filter::RouteFilter,
    traits::RouteRepository,
    AppResult,
};

/// PostgreSQL implementation of RouteRepository
pub struct PgRouteRepository {
    pool: PgPool,
}

impl PgRouteRepository {
    /// Create a new route repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Per-route completion rate, mirroring `Route::completion_rate`
const COMPLETION_RATE_SQL: &str = "CASE \
    WHEN status = 'completed' THEN 100.0 \
    WHEN cardinality(bin_ids) = 0 THEN 0.0 \
    ELSE progress::float8 / cardinality(bin_ids) * 100.0 END";

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &RouteFilter) {
    if !filter.statuses.is_empty() {
        let statuses: Vec<String> = filter.statuses.iter().map(|s| s.to_string()).collect();
        qb.push(" AND status = ANY(").push_bind(statuses).push(")");
    }
}

#[async_trait]
impl RouteRepository for PgRouteRepository {
    #[instrument(skip(self))]
    async fn count(&self, filter: &RouteFilter) -> AppResult<i64> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM routes WHERE TRUE");
        push_filter(&mut qb, filter);

        qb.build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("count routes"))
    }

    #[instrument(skip(self))]
    async fn efficiency(&self, filter: &RouteFilter) -> AppResult<Option<RouteEfficiency>> {
        debug!("Computing route efficiency");

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT AVG(duration)::float8 AS avg_duration, AVG(distance)::float8 AS avg_distance, \
             AVG({})::float8 AS avg_completion_rate, COUNT(*) AS total_routes \
             FROM routes WHERE TRUE",
            COMPLETION_RATE_SQL
        ));
        push_filter(&mut qb, filter);

        let row = qb
            .build_query_as::<EfficiencyRow>()
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("compute route efficiency"))?;

        if row.total_routes == 0 {
            return Ok(None);
        }

        Ok(Some(RouteEfficiency {
            avg_duration: row.avg_duration.unwrap_or(0.0),
            avg_distance: row.avg_distance.unwrap_or(0.0),
            avg_completion_rate: row.avg_completion_rate.unwrap_or(0.0),
            total_routes: row.total_routes,
        }))
    }

    #[instrument(skip(self))]
    async fn group_by_area(&self) -> AppResult<Vec<AreaRoutes>> {
        let rows: Vec<(String, i64, i64)> = sqlx::query_as(
            "SELECT area, COUNT(*), COALESCE(SUM(cardinality(bin_ids)), 0)::int8 \
             FROM routes GROUP BY area",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("group routes by area"))?;

        Ok(rows
            .into_iter()
            .map(|(area, route_count, total_bins)| AreaRoutes {
                area,
                route_count,
                total_bins,
            })
            .collect())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EfficiencyRow {
    avg_duration: Option<f64>,
    avg_distance: Option<f64>,
    avg_completion_rate: Option<f64>,
    total_routes: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wastewise_core::models::RouteStatus;

    #[test]
    fn test_status_filter_sql() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM routes WHERE TRUE");
        push_filter(&mut qb, &RouteFilter::with_statuses(&RouteStatus::MEASURED));
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM routes WHERE TRUE AND status = ANY($1)"
        );
    }
}
