//! Authentication and authorization for WasteWise analytics
//!
//! Login and token issuance live in the account service. This crate verifies
//! the bearer token on each analytics request and enforces the role sets the
//! endpoints require.
//!
//! # Using extractors in Actix-web
//!
//! ```no_run
//! use actix_web::HttpResponse;
//! use wastewise_auth::{OversightUser, StaffUser};
//!
//! async fn operations(user: StaffUser) -> HttpResponse {
//!     HttpResponse::Ok().body(user.principal.id.to_string())
//! }
//!
//! async fn finance(_user: OversightUser) -> HttpResponse {
//!     HttpResponse::Ok().finish()
//! }
//! ```

pub mod claims;
pub mod jwt;
pub mod middleware;

pub use claims::Claims;
pub use jwt::JwtService;
pub use middleware::{AuthenticatedUser, OversightUser, StaffUser};
