//! Collection record model
//!
//! One emptied bin, logged by a collector while working a route.

use super::bin::WasteType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Collection record entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionRecord {
    pub id: Uuid,

    /// When the bin was emptied
    pub collection_date: DateTime<Utc>,

    pub waste_type: WasteType,

    /// Collected weight in kilograms
    pub waste_weight: f64,

    pub collector: Option<Uuid>,

    pub bin: Option<Uuid>,

    pub resident: Option<Uuid>,

    pub route: Option<Uuid>,
}

impl Default for CollectionRecord {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            collection_date: Utc::now(),
            waste_type: WasteType::General,
            waste_weight: 0.0,
            collector: None,
            bin: None,
            resident: None,
            route: None,
        }
    }
}
