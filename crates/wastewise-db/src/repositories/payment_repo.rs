//! Payment repository implementation
//!
//! Revenue aggregates use `NUMERIC` sums decoded into `Decimal`; empty
//! groups sum to zero rather than NULL.

use crate::repositories::collection_repo::user_ref;
use crate::sql::{db_error, decode, push_window};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, instrument};
use uuid::Uuid;
use wastewise_core::{
    aggregates::{MethodRevenue, MonthlyRevenue, PaymentExport, PaymentStatusTotal},
    filter::PaymentFilter,
    models::{Invoice, PaymentMethod, PaymentStatus},
    period::DateWindow,
    traits::PaymentRepository,
    AppError, AppResult,
};

/// PostgreSQL implementation of PaymentRepository
pub struct PgPaymentRepository {
    pool: PgPool,
}

impl PgPaymentRepository {
    /// Create a new payment repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentRepository for PgPaymentRepository {
    #[instrument(skip(self))]
    async fn sum_amount(&self, filter: &PaymentFilter) -> AppResult<Decimal> {
        let mut qb =
            QueryBuilder::<Postgres>::new("SELECT COALESCE(SUM(amount), 0) FROM payments WHERE TRUE");
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        push_window(&mut qb, "created_at", &filter.created);

        qb.build_query_scalar::<Decimal>()
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("sum payments"))
    }

    #[instrument(skip(self))]
    async fn monthly_revenue(&self, window: &DateWindow) -> AppResult<Vec<MonthlyRevenue>> {
        debug!("Aggregating monthly revenue");

        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT EXTRACT(MONTH FROM created_at AT TIME ZONE 'UTC')::int4 AS month, \
             COALESCE(SUM(amount), 0) AS revenue, COUNT(*) AS count \
             FROM payments WHERE status = ",
        );
        qb.push_bind(PaymentStatus::Completed.as_str());
        push_window(&mut qb, "created_at", window);
        qb.push(" GROUP BY 1");

        let rows = qb
            .build_query_as::<MonthRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("aggregate monthly revenue"))?;

        rows.into_iter()
            .map(|row| {
                let month = u32::try_from(row.month).map_err(|_| {
                    AppError::Database(format!("Unexpected month value: {}", row.month))
                })?;
                Ok(MonthlyRevenue {
                    month,
                    revenue: row.revenue,
                    count: row.count,
                })
            })
            .collect()
    }

    #[instrument(skip(self))]
    async fn totals_by_status(&self) -> AppResult<Vec<PaymentStatusTotal>> {
        let rows: Vec<(String, i64, Decimal)> = sqlx::query_as(
            "SELECT status, COUNT(*), COALESCE(SUM(amount), 0) FROM payments GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("group payments by status"))?;

        rows.into_iter()
            .map(|(status, count, total_amount)| {
                Ok(PaymentStatusTotal {
                    status: decode(&status, PaymentStatus::from_str, "status")?,
                    count,
                    total_amount,
                })
            })
            .collect()
    }

    #[instrument(skip(self))]
    async fn revenue_by_method(&self) -> AppResult<Vec<MethodRevenue>> {
        let rows: Vec<(String, Decimal, i64)> = sqlx::query_as(
            "SELECT payment_method, COALESCE(SUM(amount), 0), COUNT(*) \
             FROM payments WHERE status = $1 GROUP BY payment_method",
        )
        .bind(PaymentStatus::Completed.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("group revenue by payment method"))?;

        rows.into_iter()
            .map(|(method, revenue, count)| {
                Ok(MethodRevenue {
                    method: decode(&method, PaymentMethod::from_str, "payment_method")?,
                    revenue,
                    count,
                })
            })
            .collect()
    }

    #[instrument(skip(self))]
    async fn export(&self, window: &DateWindow) -> AppResult<Vec<PaymentExport>> {
        debug!("Exporting payments");

        let mut qb = QueryBuilder::<Postgres>::new(
            r#"
            SELECT
                p.id, p.amount, p.status, p.payment_method, p.invoice_number, p.paid_date, p.created_at,
                u.id AS user_ref_id, u.name AS user_name, u.email AS user_email
            FROM payments p
            LEFT JOIN users u ON u.id = p.user_id
            WHERE TRUE
            "#,
        );
        push_window(&mut qb, "p.created_at", window);
        qb.push(" ORDER BY p.created_at DESC, p.id");

        let rows = qb
            .build_query_as::<ExportRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("export payments"))?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MonthRow {
    month: i32,
    revenue: Decimal,
    count: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct ExportRow {
    id: Uuid,
    amount: Decimal,
    status: String,
    payment_method: String,
    invoice_number: Option<String>,
    paid_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    user_ref_id: Option<Uuid>,
    user_name: Option<String>,
    user_email: Option<String>,
}

impl TryFrom<ExportRow> for PaymentExport {
    type Error = AppError;

    fn try_from(row: ExportRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            amount: row.amount,
            status: decode(&row.status, PaymentStatus::from_str, "status")?,
            payment_method: decode(&row.payment_method, PaymentMethod::from_str, "payment_method")?,
            invoice: Invoice {
                invoice_number: row.invoice_number,
                paid_date: row.paid_date,
            },
            created_at: row.created_at,
            user: user_ref(row.user_ref_id, row.user_name, row.user_email),
        })
    }
}
