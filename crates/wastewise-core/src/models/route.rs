//! Collection route model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Route status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RouteStatus {
    #[default]
    Planned,
    Active,
    Completed,
    Cancelled,
}

impl RouteStatus {
    /// Statuses included in efficiency reporting
    pub const MEASURED: [RouteStatus; 2] = [RouteStatus::Active, RouteStatus::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            RouteStatus::Planned => "planned",
            RouteStatus::Active => "active",
            RouteStatus::Completed => "completed",
            RouteStatus::Cancelled => "cancelled",
        }
    }

    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "planned" => Some(RouteStatus::Planned),
            "active" => Some(RouteStatus::Active),
            "completed" => Some(RouteStatus::Completed),
            "cancelled" => Some(RouteStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for RouteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Route entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: Uuid,

    pub name: String,

    pub status: RouteStatus,

    /// Service area (district, neighbourhood)
    pub area: String,

    /// Bins visited by the route, in order
    pub bins: Vec<Uuid>,

    /// Planned duration in minutes
    pub duration: f64,

    /// Planned distance in kilometres
    pub distance: f64,

    /// Number of bins already serviced
    pub progress: u32,

    pub assigned_collector: Option<Uuid>,

    pub scheduled_date: Option<DateTime<Utc>>,
}

impl Route {
    /// Completion rate in percent.
    ///
    /// A completed route is always 100; otherwise serviced bins over
    /// total bins. A route with no bins has nothing serviced and yields 0.
    pub fn completion_rate(&self) -> f64 {
        if self.status == RouteStatus::Completed {
            return 100.0;
        }
        if self.bins.is_empty() {
            return 0.0;
        }
        f64::from(self.progress) / self.bins.len() as f64 * 100.0
    }
}

impl Default for Route {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: String::new(),
            status: RouteStatus::Planned,
            area: String::new(),
            bins: Vec::new(),
            duration: 0.0,
            distance: 0.0,
            progress: 0,
            assigned_collector: None,
            scheduled_date: None,
        }
    }
}
