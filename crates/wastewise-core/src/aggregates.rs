//! Grouped rows returned by the reporting repositories
//!
//! Field names follow the wire format of the analytics API: grouping keys
//! serialize as `_id`, everything else in camelCase. Repositories return
//! groups in no particular order; callers sort.

use crate::error::AppError;
use crate::models::{
    Invoice, PaymentMethod, PaymentStatus, PickupStatus, UserRef, WasteType,
};
use crate::period::BucketKey;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// `{_id, count}` for any grouping key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCount<K> {
    #[serde(rename = "_id")]
    pub key: K,
    pub count: i64,
}

impl<K> GroupCount<K> {
    pub fn new(key: K, count: i64) -> Self {
        Self { key, count }
    }
}

/// Collection totals for one waste type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteTypeTotal {
    #[serde(rename = "type")]
    pub waste_type: WasteType,
    pub count: i64,
    pub total_weight: f64,
}

/// Collection totals for one calendar bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteTrendPoint {
    pub bucket: BucketKey,
    pub count: i64,
    pub total_weight: f64,
}

/// Averages over measured routes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEfficiency {
    pub avg_duration: f64,
    pub avg_distance: f64,
    pub avg_completion_rate: f64,
    pub total_routes: i64,
}

/// Trailing-period totals for one collector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectorPerformance {
    #[serde(rename = "_id")]
    pub collector_id: Uuid,
    pub collections_completed: i64,
    pub total_weight: f64,
    pub avg_weight: f64,
    /// Absent when the collector no longer exists
    pub collector_name: Option<String>,
    pub collector_email: Option<String>,
}

/// Fill statistics for one waste type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinUtilization {
    #[serde(rename = "_id")]
    pub waste_type: WasteType,
    pub avg_fill_level: f64,
    pub count: i64,
}

/// Route totals for one service area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaRoutes {
    #[serde(rename = "_id")]
    pub area: String,
    pub route_count: i64,
    pub total_bins: i64,
}

/// Bin totals for one address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationBins {
    #[serde(rename = "_id")]
    pub address: String,
    pub bin_count: i64,
    pub avg_fill_level: f64,
}

/// Completed revenue for one month (1-12)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRevenue {
    #[serde(rename = "_id")]
    pub month: u32,
    pub revenue: Decimal,
    pub count: i64,
}

/// Payment totals for one status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusTotal {
    #[serde(rename = "_id")]
    pub status: PaymentStatus,
    pub count: i64,
    pub total_amount: Decimal,
}

/// Completed revenue for one payment method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodRevenue {
    #[serde(rename = "_id")]
    pub method: PaymentMethod,
    pub revenue: Decimal,
    pub count: i64,
}

/// Month-over-month change in percent, rounded to one decimal.
///
/// Both zero gives 0; growth from zero gives 100.
pub fn percentage_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return if current > 0.0 { 100.0 } else { 0.0 };
    }
    round1((current - previous) / previous * 100.0)
}

/// Round to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Data sets available for export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    Collections,
    Pickups,
    Payments,
}

impl ExportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportKind::Collections => "collections",
            ExportKind::Pickups => "pickups",
            ExportKind::Payments => "payments",
        }
    }

    /// Validate the raw `type` parameter; absent or unknown is rejected
    pub fn parse(s: Option<&str>) -> Result<Self, AppError> {
        s.ok_or(AppError::InvalidExportType)?.parse()
    }
}

impl FromStr for ExportKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "collections" => Ok(ExportKind::Collections),
            "pickups" => Ok(ExportKind::Pickups),
            "payments" => Ok(ExportKind::Payments),
            _ => Err(AppError::InvalidExportType),
        }
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bin identity embedded in collection exports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinRef {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub bin_id: String,
    pub waste_type: WasteType,
    pub address: String,
}

/// Route identity embedded in collection exports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRef {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub area: String,
}

/// Collection record with its relations expanded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionExport {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub collection_date: DateTime<Utc>,
    pub waste_type: WasteType,
    pub waste_weight: f64,
    pub bin: Option<BinRef>,
    pub collector: Option<UserRef>,
    pub resident: Option<UserRef>,
    pub route: Option<RouteRef>,
}

/// Pickup request with its relations expanded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupExport {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub status: PickupStatus,
    pub waste_type: WasteType,
    pub request_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    /// Requesting resident
    pub resident: Option<UserRef>,
    pub collector: Option<UserRef>,
}

/// Payment with its payer expanded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentExport {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub amount: Decimal,
    pub status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub invoice: Invoice,
    pub created_at: DateTime<Utc>,
    pub user: Option<UserRef>,
}

/// Export result; serializes as a bare array of rows
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExportRecords {
    Collections(Vec<CollectionExport>),
    Pickups(Vec<PickupExport>),
    Payments(Vec<PaymentExport>),
}

impl ExportRecords {
    pub fn len(&self) -> usize {
        match self {
            ExportRecords::Collections(rows) => rows.len(),
            ExportRecords::Pickups(rows) => rows.len(),
            ExportRecords::Payments(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
