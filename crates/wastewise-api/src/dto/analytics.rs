//! Analytics query parameter DTOs

use serde::Deserialize;
use validator::Validate;
use wastewise_core::aggregates::ExportKind;
use wastewise_core::period::{parse_optional_date, DateWindow, TimeBucket};
use wastewise_core::AppResult;

/// Query parameters for `GET /api/analytics/waste`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteStatsParams {
    /// Inclusive lower bound on the collection date
    pub start_date: Option<String>,
    /// Inclusive upper bound on the collection date
    pub end_date: Option<String>,
    /// `day` (default) or `month`
    pub group_by: Option<String>,
}

impl WasteStatsParams {
    /// Inclusive window from `startDate`/`endDate`
    pub fn window(&self) -> AppResult<DateWindow> {
        date_window(self.start_date.as_deref(), self.end_date.as_deref())
    }

    /// Trend granularity
    pub fn bucket(&self) -> TimeBucket {
        TimeBucket::parse(self.group_by.as_deref())
    }
}

/// Query parameters for `GET /api/analytics/financial`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct FinancialParams {
    /// Calendar year; the current year when absent
    #[validate(range(min = 1970, max = 9999))]
    pub year: Option<i32>,
}

/// Query parameters for `GET /api/analytics/export`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportParams {
    /// `collections`, `pickups` or `payments`
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Inclusive lower bound on the row's date field
    pub start_date: Option<String>,
    /// Inclusive upper bound on the row's date field
    pub end_date: Option<String>,
}

impl ExportParams {
    /// Requested data set; absent or unknown values are rejected
    pub fn kind(&self) -> AppResult<ExportKind> {
        ExportKind::parse(self.kind.as_deref())
    }

    /// Inclusive window from `startDate`/`endDate`
    pub fn window(&self) -> AppResult<DateWindow> {
        date_window(self.start_date.as_deref(), self.end_date.as_deref())
    }
}

fn date_window(start: Option<&str>, end: Option<&str>) -> AppResult<DateWindow> {
    Ok(DateWindow::inclusive(
        parse_optional_date(start)?,
        parse_optional_date(end)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::ops::Bound;
    use wastewise_core::AppError;

    #[test]
    fn test_waste_params_window() {
        let params = WasteStatsParams {
            start_date: Some("2026-01-01".to_string()),
            end_date: Some("2026-01-31T23:59:59Z".to_string()),
            group_by: Some("month".to_string()),
        };

        let window = params.window().unwrap();
        assert_eq!(
            window.start,
            Bound::Included(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            window.end,
            Bound::Included(Utc.with_ymd_and_hms(2026, 1, 31, 23, 59, 59).unwrap())
        );
        assert_eq!(params.bucket(), TimeBucket::Month);
    }

    #[test]
    fn test_waste_params_defaults() {
        let params = WasteStatsParams::default();
        assert!(params.window().unwrap().is_unbounded());
        assert_eq!(params.bucket(), TimeBucket::Day);
    }

    #[test]
    fn test_unparsable_date_is_rejected() {
        let params = WasteStatsParams {
            start_date: Some("last tuesday".to_string()),
            ..Default::default()
        };
        assert!(matches!(params.window(), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_financial_year_range() {
        assert!(FinancialParams { year: None }.validate().is_ok());
        assert!(FinancialParams { year: Some(2026) }.validate().is_ok());
        assert!(FinancialParams { year: Some(1969) }.validate().is_err());
        assert!(FinancialParams { year: Some(10000) }.validate().is_err());
    }

    #[test]
    fn test_export_kind() {
        let params = ExportParams {
            kind: Some("pickups".to_string()),
            ..Default::default()
        };
        assert_eq!(params.kind().unwrap(), ExportKind::Pickups);

        let params = ExportParams {
            kind: Some("bogus".to_string()),
            ..Default::default()
        };
        assert!(matches!(params.kind(), Err(AppError::InvalidExportType)));
        assert!(matches!(
            ExportParams::default().kind(),
            Err(AppError::InvalidExportType)
        ));
    }

    #[test]
    fn test_params_deserialize_wire_names() {
        let params: ExportParams =
            serde_json::from_value(serde_json::json!({"type": "payments", "startDate": "2026-02-01"}))
                .unwrap();
        assert_eq!(params.kind.as_deref(), Some("payments"));
        assert_eq!(params.start_date.as_deref(), Some("2026-02-01"));
    }
}
