//! Time windows and calendar buckets for reporting
//!
//! All boundaries are UTC. Windows are built from immutable values so that
//! the start and end of a period never share mutable state.

use crate::error::AppError;
use crate::AppResult;
use chrono::{DateTime, Datelike, Days, Duration, Months, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::{Bound, RangeBounds};

/// Length of the trailing window used by activity and performance reports
pub const TRAILING_DAYS: i64 = 30;

/// A range of instants with independently optional bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: Bound<DateTime<Utc>>,
    pub end: Bound<DateTime<Utc>>,
}

impl Default for DateWindow {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl DateWindow {
    /// Window matching every instant
    pub const fn unbounded() -> Self {
        Self {
            start: Bound::Unbounded,
            end: Bound::Unbounded,
        }
    }

    /// `[start, end]`, either side optional
    pub fn inclusive(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self {
            start: start.map_or(Bound::Unbounded, Bound::Included),
            end: end.map_or(Bound::Unbounded, Bound::Included),
        }
    }

    /// `[start, end)`
    pub fn half_open(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Bound::Included(start),
            end: Bound::Excluded(end),
        }
    }

    /// `[start, ∞)`
    pub fn since(start: DateTime<Utc>) -> Self {
        Self {
            start: Bound::Included(start),
            end: Bound::Unbounded,
        }
    }

    /// `(-∞, end)`
    pub fn before(end: DateTime<Utc>) -> Self {
        Self {
            start: Bound::Unbounded,
            end: Bound::Excluded(end),
        }
    }

    /// The trailing `days` ending at `now`
    pub fn trailing_days(now: DateTime<Utc>, days: i64) -> Self {
        Self::since(now - Duration::days(days))
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        (self.start, self.end).contains(&ts)
    }

    /// Optional instants are outside every bounded window
    pub fn contains_opt(&self, ts: Option<DateTime<Utc>>) -> bool {
        match ts {
            Some(ts) => self.contains(ts),
            None => self.is_unbounded(),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(
            (self.start, self.end),
            (Bound::Unbounded, Bound::Unbounded)
        )
    }
}

/// Calendar windows the dashboard compares against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingPeriods {
    pub today: DateWindow,
    pub this_month: DateWindow,
    pub last_month: DateWindow,
    /// First instant of the current month (end of the previous one)
    pub month_start: DateTime<Utc>,
    /// Window of the trailing activity period
    pub trailing: DateWindow,
}

impl ReportingPeriods {
    /// Derive every boundary from a single immutable `now`
    pub fn at(now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        let day_start = midnight(today);
        let day_end = midnight(today + Days::new(1));

        let first = first_of_month(today);
        let month_start = midnight(first);
        let next_month_start = midnight(first + Months::new(1));
        let last_month_start = midnight(first - Months::new(1));

        Self {
            today: DateWindow::half_open(day_start, day_end),
            this_month: DateWindow::half_open(month_start, next_month_start),
            last_month: DateWindow::half_open(last_month_start, month_start),
            month_start,
            trailing: DateWindow::trailing_days(now, TRAILING_DAYS),
        }
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

/// `[year-01-01, (year+1)-01-01)`
pub fn year_window(year: i32) -> AppResult<DateWindow> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1)
        .ok_or_else(|| AppError::InvalidInput(format!("Invalid year: {}", year)))?;
    let end = NaiveDate::from_ymd_opt(year + 1, 1, 1)
        .ok_or_else(|| AppError::InvalidInput(format!("Invalid year: {}", year)))?;
    Ok(DateWindow::half_open(midnight(start), midnight(end)))
}

/// Parse a caller-supplied date: RFC 3339, or `YYYY-MM-DD` at midnight UTC
pub fn parse_date(s: &str) -> AppResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(midnight(date));
    }

    Err(AppError::InvalidInput(format!(
        "Invalid date: {}. Expected ISO 8601 or YYYY-MM-DD",
        s
    )))
}

/// Parse an optional date parameter; empty strings count as absent
pub fn parse_optional_date(s: Option<&str>) -> AppResult<Option<DateTime<Utc>>> {
    match s.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_date(s).map(Some),
    }
}

/// Calendar granularity for time-series grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeBucket {
    #[default]
    Day,
    Month,
}

impl TimeBucket {
    /// `month` selects monthly buckets; anything else is daily
    pub fn parse(s: Option<&str>) -> Self {
        match s.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("month") => TimeBucket::Month,
            _ => TimeBucket::Day,
        }
    }

    /// Grouping key of `ts` at this granularity
    pub fn key(&self, ts: DateTime<Utc>) -> BucketKey {
        BucketKey {
            year: ts.year(),
            month: ts.month(),
            day: match self {
                TimeBucket::Day => Some(ts.day()),
                TimeBucket::Month => None,
            },
        }
    }
}

/// Calendar grouping key; orders by year, month, then day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BucketKey {
    pub year: i32,
    pub month: u32,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub day: Option<u32>,
}
