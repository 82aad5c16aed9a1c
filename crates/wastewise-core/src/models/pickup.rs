//! Pickup request model
//!
//! Resident-initiated requests for an off-schedule collection.

use super::bin::WasteType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Pickup request lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PickupStatus {
    #[default]
    Pending,
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl PickupStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PickupStatus::Pending => "pending",
            PickupStatus::Scheduled => "scheduled",
            PickupStatus::InProgress => "in-progress",
            PickupStatus::Completed => "completed",
            PickupStatus::Cancelled => "cancelled",
        }
    }

    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(PickupStatus::Pending),
            "scheduled" => Some(PickupStatus::Scheduled),
            "in-progress" => Some(PickupStatus::InProgress),
            "completed" => Some(PickupStatus::Completed),
            "cancelled" => Some(PickupStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for PickupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pickup request entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupRequest {
    pub id: Uuid,

    pub status: PickupStatus,

    pub waste_type: WasteType,

    /// Date the resident asked the pickup for
    pub request_date: DateTime<Utc>,

    /// Resident who filed the request
    pub requested_by: Option<Uuid>,

    /// Collector assigned to the pickup
    pub collector: Option<Uuid>,

    pub created_at: DateTime<Utc>,
}

impl Default for PickupRequest {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            status: PickupStatus::Pending,
            waste_type: WasteType::General,
            request_date: now,
            requested_by: None,
            collector: None,
            created_at: now,
        }
    }
}
