//! JWT Claims structure
//!
//! Tokens are issued by the account service; this crate only verifies them.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wastewise_core::models::{Principal, UserRole};
use wastewise_core::{AppError, AppResult};

/// JWT Claims
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    /// User role
    pub role: UserRole,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create claims for a user; expiration is filled in by `JwtService`
    ///
    /// # Examples
    ///
    /// ```
    /// use wastewise_auth::Claims;
    /// use wastewise_core::models::UserRole;
    /// use uuid::Uuid;
    ///
    /// let id = Uuid::new_v4();
    /// let claims = Claims::new(id, UserRole::Admin);
    /// assert_eq!(claims.sub, id.to_string());
    /// ```
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self {
            sub: user_id.to_string(),
            role,
            iat: Utc::now().timestamp(),
            exp: 0,
        }
    }

    /// Whether `exp` has passed
    pub fn is_expired(&self) -> bool {
        self.exp <= Utc::now().timestamp()
    }

    /// Parse the subject as a user id
    pub fn user_id(&self) -> AppResult<Uuid> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| AppError::InvalidToken(format!("Invalid subject: {}", self.sub)))
    }

    /// Caller identity carried into the reporters
    pub fn principal(&self) -> AppResult<Principal> {
        Ok(Principal::new(self.user_id()?, self.role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_fresh_claims_without_expiration() {
        let id = Uuid::new_v4();
        let claims = Claims::new(id, UserRole::Operator);
        assert_eq!(claims.exp, 0);
        assert!(claims.iat <= Utc::now().timestamp());
        assert_eq!(claims.user_id().unwrap(), id);
    }

    #[test]
    fn test_expired_claims() {
        let mut claims = Claims::new(Uuid::new_v4(), UserRole::Resident);
        claims.exp = (Utc::now() - Duration::hours(1)).timestamp();
        assert!(claims.is_expired());
    }

    #[test]
    fn test_principal_from_claims() {
        let id = Uuid::new_v4();
        let principal = Claims::new(id, UserRole::Resident).principal().unwrap();
        assert_eq!(principal.id, id);
        assert!(principal.is_resident());
    }

    #[test]
    fn test_non_uuid_subject_is_rejected() {
        let mut claims = Claims::new(Uuid::new_v4(), UserRole::Admin);
        claims.sub = "admin".to_string();
        assert!(matches!(claims.principal(), Err(AppError::InvalidToken(_))));
    }
}
