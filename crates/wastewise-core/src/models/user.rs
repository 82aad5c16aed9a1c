//! User model
//!
//! Represents platform users and the authenticated principal derived from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// User role enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Platform administrator
    Admin,
    /// Field worker emptying bins
    Collector,
    /// Household using the service
    #[default]
    Resident,
    /// Operations staff planning routes
    Operator,
    /// Municipal authority with oversight access
    Authority,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl UserRole {
    /// Every role, in reporting order
    pub const ALL: [UserRole; 5] = [
        UserRole::Admin,
        UserRole::Collector,
        UserRole::Resident,
        UserRole::Operator,
        UserRole::Authority,
    ];

    /// Roles allowed to see operational analytics
    pub const STAFF: [UserRole; 3] = [UserRole::Operator, UserRole::Authority, UserRole::Admin];

    /// Roles allowed to see financial analytics and exports
    pub const OVERSIGHT: [UserRole; 2] = [UserRole::Authority, UserRole::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Collector => "collector",
            UserRole::Resident => "resident",
            UserRole::Operator => "operator",
            UserRole::Authority => "authority",
        }
    }

    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(UserRole::Admin),
            "collector" => Some(UserRole::Collector),
            "resident" => Some(UserRole::Resident),
            "operator" => Some(UserRole::Operator),
            "authority" => Some(UserRole::Authority),
            _ => None,
        }
    }

    /// Check if the role is one of `allowed`
    pub fn is_any_of(&self, allowed: &[UserRole]) -> bool {
        allowed.contains(self)
    }
}

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// User role
    pub role: UserRole,

    /// Last login timestamp
    pub last_login: Option<DateTime<Utc>>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Default for User {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: String::new(),
            email: String::new(),
            role: UserRole::Resident,
            last_login: None,
            created_at: Utc::now(),
        }
    }
}

/// User identity embedded in reports and exports (no sensitive data)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserRef {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Authenticated caller attached to every analytics request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub id: Uuid,
    pub role: UserRole,
}

impl Principal {
    pub fn new(id: Uuid, role: UserRole) -> Self {
        Self { id, role }
    }

    /// Residents only ever see records they own
    pub fn is_resident(&self) -> bool {
        self.role == UserRole::Resident
    }
}
