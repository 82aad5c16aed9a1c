//! HTTP request handlers

pub mod analytics;

use actix_web::HttpResponse;

pub use analytics::configure as configure_analytics;

/// Health check endpoint
///
/// GET /api/health
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "wastewise-analytics",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
