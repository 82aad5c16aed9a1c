//! API layer for WasteWise analytics
//!
//! HTTP handlers and DTOs for the reporting endpoints.

#![forbid(unsafe_code)]
#![warn(clippy::all, missing_docs)]

pub mod dto;
pub mod handlers;

pub use dto::ApiResponse;
pub use handlers::{configure_analytics, health_check};

use actix_web::web;

/// Mount every API route under `/api`
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health_check))
            .configure(configure_analytics),
    );
}
