//! Helpers shared by the PostgreSQL repositories

use sqlx::{Postgres, QueryBuilder};
use std::ops::Bound;
use tracing::error;
use wastewise_core::period::{DateWindow, TimeBucket};
use wastewise_core::AppError;

/// Append `AND column <op> $n` for each bounded side of `window`
pub(crate) fn push_window(qb: &mut QueryBuilder<'_, Postgres>, column: &str, window: &DateWindow) {
    match window.start {
        Bound::Included(t) => {
            qb.push(" AND ").push(column).push(" >= ").push_bind(t);
        }
        Bound::Excluded(t) => {
            qb.push(" AND ").push(column).push(" > ").push_bind(t);
        }
        Bound::Unbounded => {}
    }
    match window.end {
        Bound::Included(t) => {
            qb.push(" AND ").push(column).push(" <= ").push_bind(t);
        }
        Bound::Excluded(t) => {
            qb.push(" AND ").push(column).push(" < ").push_bind(t);
        }
        Bound::Unbounded => {}
    }
}

/// Select list producing `year`, `month` and `day` columns for a bucket
pub(crate) fn bucket_columns(bucket: TimeBucket, column: &str) -> String {
    let day = match bucket {
        TimeBucket::Day => format!("EXTRACT(DAY FROM {} AT TIME ZONE 'UTC')::int4", column),
        TimeBucket::Month => "NULL::int4".to_string(),
    };
    format!(
        "EXTRACT(YEAR FROM {c} AT TIME ZONE 'UTC')::int4 AS year, \
         EXTRACT(MONTH FROM {c} AT TIME ZONE 'UTC')::int4 AS month, \
         {day} AS day",
        c = column,
        day = day
    )
}

/// Map a sqlx error to the echoed database error, logging the context
pub(crate) fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        error!("Database error, failed to {}: {}", context, e);
        AppError::Database(format!("Failed to {}: {}", context, e))
    }
}

/// Decode a text column into a domain enum
pub(crate) fn decode<T>(
    value: &str,
    parse: fn(&str) -> Option<T>,
    column: &'static str,
) -> Result<T, AppError> {
    parse(value).ok_or_else(|| {
        error!("Unexpected value '{}' in column {}", value, column);
        AppError::Database(format!("Unexpected {} value: {}", column, value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_push_window_bounds() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();

        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM t WHERE TRUE");
        push_window(&mut qb, "created_at", &DateWindow::half_open(start, end));
        assert_eq!(
            qb.sql(),
            "SELECT 1 FROM t WHERE TRUE AND created_at >= $1 AND created_at < $2"
        );

        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM t WHERE TRUE");
        push_window(&mut qb, "created_at", &DateWindow::unbounded());
        assert_eq!(qb.sql(), "SELECT 1 FROM t WHERE TRUE");
    }

    #[test]
    fn test_bucket_columns() {
        assert!(bucket_columns(TimeBucket::Month, "d").contains("NULL::int4 AS day"));
        assert!(bucket_columns(TimeBucket::Day, "d").contains("EXTRACT(DAY FROM d"));
    }

    #[test]
    fn test_decode_rejects_unknown() {
        use wastewise_core::models::WasteType;
        assert!(decode("organic", WasteType::from_str, "waste_type").is_ok());
        assert!(matches!(
            decode("plutonium", WasteType::from_str, "waste_type"),
            Err(AppError::Database(_))
        ));
    }
}
