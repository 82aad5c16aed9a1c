//! Analytics handlers
//!
//! HTTP handlers for the reporting endpoints under `/api/analytics`.

use crate::dto::{ApiResponse, ExportParams, FinancialParams, WasteStatsParams};
use actix_web::{error::InternalError, web, HttpResponse};
use tracing::{debug, error, instrument, warn};
use validator::Validate;
use wastewise_auth::{AuthenticatedUser, OversightUser, StaffUser};
use wastewise_core::AppError;
use wastewise_services::AnalyticsService;

/// Get the dashboard summary
///
/// GET /api/analytics/dashboard
#[instrument(skip(service, user), fields(user_id = %user.principal.id))]
pub async fn get_dashboard(service: web::Data<AnalyticsService>, user: StaffUser) -> HttpResponse {
    debug!("Fetching dashboard summary");

    match service.dashboard_stats(&user.principal).await {
        Ok(summary) => HttpResponse::Ok().json(ApiResponse::success(summary)),
        Err(e) => {
            error!(error = %e, code = e.error_code(), "Dashboard summary failed");
            HttpResponse::build(e.status_code()).json(ApiResponse::failure_with_error(e.to_string()))
        }
    }
}

/// Get waste statistics by type and over time
///
/// GET /api/analytics/waste
#[instrument(skip(service, _user))]
pub async fn get_waste_statistics(
    service: web::Data<AnalyticsService>,
    _user: AuthenticatedUser,
    query: web::Query<WasteStatsParams>,
) -> Result<HttpResponse, AppError> {
    let window = query.window()?;
    let bucket = query.bucket();
    debug!(?bucket, "Fetching waste statistics");

    let stats = service.waste_statistics(window, bucket).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(stats)))
}

/// Get route, collector and bin efficiency metrics
///
/// GET /api/analytics/efficiency
#[instrument(skip(service, _user))]
pub async fn get_efficiency_metrics(
    service: web::Data<AnalyticsService>,
    _user: StaffUser,
) -> Result<HttpResponse, AppError> {
    let metrics = service.efficiency_metrics().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(metrics)))
}

/// Get revenue and payment analytics for a year
///
/// GET /api/analytics/financial
#[instrument(skip(service, _user))]
pub async fn get_financial_analytics(
    service: web::Data<AnalyticsService>,
    _user: OversightUser,
    query: web::Query<FinancialParams>,
) -> Result<HttpResponse, AppError> {
    query.validate().map_err(|e| {
        warn!("Financial query validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let analytics = service.financial_analytics(query.year).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(analytics)))
}

/// Get routes per area and bins per location
///
/// GET /api/analytics/areas
#[instrument(skip(service, _user))]
pub async fn get_area_statistics(
    service: web::Data<AnalyticsService>,
    _user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let stats = service.area_statistics().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(stats)))
}

/// Get user, pickup and ticket engagement statistics
///
/// GET /api/analytics/engagement
#[instrument(skip(service, _user))]
pub async fn get_engagement_statistics(
    service: web::Data<AnalyticsService>,
    _user: StaffUser,
) -> Result<HttpResponse, AppError> {
    let stats = service.engagement_statistics().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(stats)))
}

/// Export raw records of one type
///
/// GET /api/analytics/export?type=collections|pickups|payments
#[instrument(skip(service, _user))]
pub async fn export_data(
    service: web::Data<AnalyticsService>,
    _user: OversightUser,
    query: web::Query<ExportParams>,
) -> Result<HttpResponse, AppError> {
    let kind = query.kind().map_err(|e| {
        warn!(requested = ?query.kind, "Rejected export type");
        e
    })?;
    let window = query.window()?;

    let records = service.export(kind, window).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(records)))
}

/// Malformed query strings render in the API envelope
fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        warn!("Invalid query string: {}", message);
        InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(ApiResponse::failure(message)),
        )
        .into()
    })
}

/// Configure analytics routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/analytics")
            .app_data(query_config())
            .route("/dashboard", web::get().to(get_dashboard))
            .route("/waste", web::get().to(get_waste_statistics))
            .route("/efficiency", web::get().to(get_efficiency_metrics))
            .route("/financial", web::get().to(get_financial_analytics))
            .route("/areas", web::get().to(get_area_statistics))
            .route("/engagement", web::get().to(get_engagement_statistics))
            .route("/export", web::get().to(export_data)),
    );
}
