//! Ticket repository implementation

use crate::sql::{db_error, decode, push_window};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;
use wastewise_core::{
    aggregates::GroupCount, filter::TicketFilter, models::TicketStatus,
    traits::TicketRepository, AppResult,
};

/// PostgreSQL implementation of TicketRepository
pub struct PgTicketRepository {
    pool: PgPool,
}

impl PgTicketRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TicketRepository for PgTicketRepository {
    #[instrument(skip(self))]
    async fn count(&self, filter: &TicketFilter) -> AppResult<i64> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM tickets WHERE TRUE");
        if !filter.statuses.is_empty() {
            let statuses: Vec<String> = filter.statuses.iter().map(|s| s.to_string()).collect();
            qb.push(" AND status = ANY(").push_bind(statuses).push(")");
        }
        push_window(&mut qb, "created_at", &filter.created);

        qb.build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("count tickets"))
    }

    #[instrument(skip(self))]
    async fn count_by_status(&self) -> AppResult<Vec<GroupCount<TicketStatus>>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM tickets GROUP BY status")
                .fetch_all(&self.pool)
                .await
                .map_err(db_error("group tickets by status"))?;

        rows.into_iter()
            .map(|(status, count)| {
                Ok(GroupCount::new(
                    decode(&status, TicketStatus::from_str, "status")?,
                    count,
                ))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_open_ticket_count() {
        let url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/wastewise".to_string());
        let pool = PgPool::connect(&url).await.unwrap();
        let repo = PgTicketRepository::new(pool);

        let open = repo.count(&TicketFilter::open()).await.unwrap();
        let all = repo.count(&TicketFilter::all()).await.unwrap();
        assert!(open <= all);
    }
}
