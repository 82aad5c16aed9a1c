//! Pickup request repository implementation

use crate::repositories::collection_repo::user_ref;
use crate::sql::{db_error, decode, push_window};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, instrument};
use uuid::Uuid;
use wastewise_core::{
    aggregates::{GroupCount, PickupExport},
    filter::PickupFilter,
    models::{PickupStatus, WasteType},
    period::DateWindow,
    traits::PickupRepository,
    AppError, AppResult,
};

/// PostgreSQL implementation of PickupRepository
pub struct PgPickupRepository {
    pool: PgPool,
}

impl PgPickupRepository {
    /// Create a new pickup request repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PickupRepository for PgPickupRepository {
    #[instrument(skip(self))]
    async fn count(&self, filter: &PickupFilter) -> AppResult<i64> {
        let mut qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM pickup_requests WHERE TRUE");
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(owner) = filter.requested_by {
            qb.push(" AND requested_by = ").push_bind(owner);
        }
        push_window(&mut qb, "created_at", &filter.created);

        qb.build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("count pickup requests"))
    }

    #[instrument(skip(self))]
    async fn count_by_status(&self) -> AppResult<Vec<GroupCount<PickupStatus>>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM pickup_requests GROUP BY status")
                .fetch_all(&self.pool)
                .await
                .map_err(db_error("group pickup requests by status"))?;

        rows.into_iter()
            .map(|(status, count)| {
                Ok(GroupCount::new(
                    decode(&status, PickupStatus::from_str, "status")?,
                    count,
                ))
            })
            .collect()
    }

    #[instrument(skip(self))]
    async fn export(&self, window: &DateWindow) -> AppResult<Vec<PickupExport>> {
        debug!("Exporting pickup requests");

        let mut qb = QueryBuilder::<Postgres>::new(
            r#"
            SELECT
                p.id, p.status, p.waste_type, p.request_date, p.created_at,
                res.id AS resident_id, res.name AS resident_name, res.email AS resident_email,
                col.id AS collector_id, col.name AS collector_name, col.email AS collector_email
            FROM pickup_requests p
            LEFT JOIN users res ON res.id = p.requested_by
            LEFT JOIN users col ON col.id = p.collector
            WHERE TRUE
            "#,
        );
        push_window(&mut qb, "p.request_date", window);
        qb.push(" ORDER BY p.request_date DESC, p.id");

        let rows = qb
            .build_query_as::<ExportRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("export pickup requests"))?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ExportRow {
    id: Uuid,
    status: String,
    waste_type: String,
    request_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
    resident_id: Option<Uuid>,
    resident_name: Option<String>,
    resident_email: Option<String>,
    collector_id: Option<Uuid>,
    collector_name: Option<String>,
    collector_email: Option<String>,
}

impl TryFrom<ExportRow> for PickupExport {
    type Error = AppError;

    fn try_from(row: ExportRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            status: decode(&row.status, PickupStatus::from_str, "status")?,
            waste_type: decode(&row.waste_type, WasteType::from_str, "waste_type")?,
            request_date: row.request_date,
            created_at: row.created_at,
            resident: user_ref(row.resident_id, row.resident_name, row.resident_email),
            collector: user_ref(row.collector_id, row.collector_name, row.collector_email),
        })
    }
}
