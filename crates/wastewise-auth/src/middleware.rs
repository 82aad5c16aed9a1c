//! Actix-web request extractors for authenticated callers
//!
//! `AuthenticatedUser` accepts any valid token. `StaffUser` and
//! `OversightUser` additionally require a role from `UserRole::STAFF` or
//! `UserRole::OVERSIGHT`. Rejections render through `AppError`, so a missing
//! or bad token is a 401 and a wrong role a 403, both in the API envelope.

use crate::jwt::JwtService;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use std::sync::Arc;
use tracing::{debug, warn};
use wastewise_core::error::AppError;
use wastewise_core::models::{Principal, UserRole};

/// Extract the bearer token: `Authorization` header first, then the
/// `token` cookie
fn extract_token_from_request(req: &HttpRequest) -> Option<String> {
    if let Some(auth_header) = req.headers().get("Authorization") {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.trim().to_string());
            }
        }
    }

    req.cookie("token").map(|cookie| cookie.value().to_string())
}

fn authenticate(req: &HttpRequest) -> Result<Principal, AppError> {
    let jwt_service = req
        .app_data::<web::Data<Arc<JwtService>>>()
        .ok_or_else(|| {
            warn!("JwtService not found in app data");
            AppError::Unauthorized("Authentication service not configured".to_string())
        })?;

    let token = extract_token_from_request(req).ok_or_else(|| {
        debug!("No authentication token found in request");
        AppError::Unauthorized("No authentication token provided".to_string())
    })?;

    let claims = jwt_service.validate_token(&token)?;
    let principal = claims.principal()?;

    debug!(
        user_id = %principal.id,
        role = %principal.role,
        "User authenticated successfully"
    );

    Ok(principal)
}

fn authorize(req: &HttpRequest, allowed: &[UserRole]) -> Result<Principal, AppError> {
    let principal = authenticate(req)?;

    if !principal.role.is_any_of(allowed) {
        warn!(
            user_id = %principal.id,
            role = %principal.role,
            path = %req.path(),
            "Role not permitted for this endpoint"
        );
        return Err(AppError::Forbidden);
    }

    Ok(principal)
}

/// Any authenticated caller
///
/// # Examples
///
/// ```no_run
/// use actix_web::HttpResponse;
/// use wastewise_auth::AuthenticatedUser;
///
/// async fn handler(user: AuthenticatedUser) -> HttpResponse {
///     HttpResponse::Ok().body(user.principal.role.to_string())
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub principal: Principal,
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            authenticate(req)
                .map(|principal| AuthenticatedUser { principal })
                .map_err(Into::into),
        )
    }
}

/// Operator, authority or admin
#[derive(Debug, Clone, Copy)]
pub struct StaffUser(pub AuthenticatedUser);

impl std::ops::Deref for StaffUser {
    type Target = AuthenticatedUser;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for StaffUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            authorize(req, &UserRole::STAFF)
                .map(|principal| StaffUser(AuthenticatedUser { principal }))
                .map_err(Into::into),
        )
    }
}

/// Authority or admin
#[derive(Debug, Clone, Copy)]
pub struct OversightUser(pub AuthenticatedUser);

impl std::ops::Deref for OversightUser {
    type Target = AuthenticatedUser;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for OversightUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            authorize(req, &UserRole::OVERSIGHT)
                .map(|principal| OversightUser(AuthenticatedUser { principal }))
                .map_err(Into::into),
        )
    }
}
