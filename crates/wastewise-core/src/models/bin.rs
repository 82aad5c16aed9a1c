//! Bin model
//!
//! Smart waste bins with a fill-level sensor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Fill level (percent) at which an active bin needs collection
pub const COLLECTION_THRESHOLD: f64 = 80.0;

/// Bin status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BinStatus {
    #[default]
    Active,
    Inactive,
    Maintenance,
    Full,
}

impl BinStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinStatus::Active => "active",
            BinStatus::Inactive => "inactive",
            BinStatus::Maintenance => "maintenance",
            BinStatus::Full => "full",
        }
    }

    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(BinStatus::Active),
            "inactive" => Some(BinStatus::Inactive),
            "maintenance" => Some(BinStatus::Maintenance),
            "full" => Some(BinStatus::Full),
            _ => None,
        }
    }
}

impl fmt::Display for BinStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Waste category shared by bins, collections and pickups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WasteType {
    #[default]
    General,
    Recyclable,
    Organic,
    Hazardous,
    Electronic,
}

impl WasteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WasteType::General => "general",
            WasteType::Recyclable => "recyclable",
            WasteType::Organic => "organic",
            WasteType::Hazardous => "hazardous",
            WasteType::Electronic => "electronic",
        }
    }

    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "general" => Some(WasteType::General),
            "recyclable" => Some(WasteType::Recyclable),
            "organic" => Some(WasteType::Organic),
            "hazardous" => Some(WasteType::Hazardous),
            "electronic" => Some(WasteType::Electronic),
            _ => None,
        }
    }
}

impl fmt::Display for WasteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical placement of a bin
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BinLocation {
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Waste bin entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bin {
    /// Unique identifier
    pub id: Uuid,

    /// Human-facing bin code (e.g. "BIN-0042")
    pub bin_id: String,

    pub status: BinStatus,

    /// Current fill level in percent (0-100)
    pub fill_level: f64,

    pub waste_type: WasteType,

    pub location: BinLocation,

    /// User who registered the bin
    pub created_by: Option<Uuid>,

    pub created_at: DateTime<Utc>,
}

impl Bin {
    /// Check if the bin should be scheduled for collection
    pub fn needs_collection(&self) -> bool {
        self.status == BinStatus::Active && self.fill_level >= COLLECTION_THRESHOLD
    }
}

impl Default for Bin {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            bin_id: String::new(),
            status: BinStatus::Active,
            fill_level: 0.0,
            waste_type: WasteType::General,
            location: BinLocation::default(),
            created_by: None,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_collection() {
        let bin = Bin {
            fill_level: 80.0,
            ..Default::default()
        };
        assert!(bin.needs_collection());

        let bin = Bin {
            fill_level: 79.9,
            ..Default::default()
        };
        assert!(!bin.needs_collection());

        let bin = Bin {
            fill_level: 95.0,
            status: BinStatus::Maintenance,
            ..Default::default()
        };
        assert!(!bin.needs_collection());
    }

    #[test]
    fn test_waste_type_round_trip_names() {
        assert_eq!(WasteType::from_str("Recyclable"), Some(WasteType::Recyclable));
        assert_eq!(WasteType::Organic.to_string(), "organic");
        assert_eq!(WasteType::from_str("plastic"), None);
    }

    #[test]
    fn test_bin_serializes_camel_case() {
        let json = serde_json::to_value(Bin {
            bin_id: "BIN-1".to_string(),
            fill_level: 42.0,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(json["binId"], "BIN-1");
        assert_eq!(json["fillLevel"], 42.0);
        assert_eq!(json["wasteType"], "general");
    }
}
