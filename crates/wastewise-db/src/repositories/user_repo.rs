//! User repository implementation

use crate::sql::{db_error, decode, push_window};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;
use wastewise_core::{
    aggregates::GroupCount, filter::UserFilter, models::UserRole, traits::UserRepository,
    AppResult,
};

/// PostgreSQL implementation of UserRepository
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &UserFilter) {
    push_window(qb, "created_at", &filter.created);
    if !filter.last_login.is_unbounded() {
        qb.push(" AND last_login IS NOT NULL");
        push_window(qb, "last_login", &filter.last_login);
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self))]
    async fn count(&self, filter: &UserFilter) -> AppResult<i64> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users WHERE TRUE");
        push_filter(&mut qb, filter);

        qb.build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("count users"))
    }

    #[instrument(skip(self))]
    async fn count_by_role(&self) -> AppResult<Vec<GroupCount<UserRole>>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT role, COUNT(*) FROM users GROUP BY role")
                .fetch_all(&self.pool)
                .await
                .map_err(db_error("group users by role"))?;

        rows.into_iter()
            .map(|(role, count)| Ok(GroupCount::new(decode(&role, UserRole::from_str, "role")?, count)))
            .collect()
    }
}
