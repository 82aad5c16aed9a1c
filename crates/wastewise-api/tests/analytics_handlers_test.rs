//! Integration tests for the analytics API handlers
//!
//! The app is assembled the way the binary does it, backed by the in-memory
//! store or by repositories that fail on purpose.

use actix_web::{test, web, App};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;
use wastewise_api::configure_routes;
use wastewise_auth::{Claims, JwtService};
use wastewise_core::aggregates::{
    CollectionExport, CollectorPerformance, GroupCount, MethodRevenue, MonthlyRevenue, PaymentExport,
    PaymentStatusTotal, PickupExport, WasteTrendPoint, WasteTypeTotal,
};
use wastewise_core::filter::{CollectionFilter, PaymentFilter, PickupFilter};
use wastewise_core::models::{
    CollectionRecord, Payment, PaymentStatus, PickupStatus, Route, User, UserRole, WasteType,
};
use wastewise_core::period::{DateWindow, TimeBucket};
use wastewise_core::traits::{CollectionRepository, PaymentRepository, PickupRepository};
use wastewise_core::{AppError, AppResult};
use wastewise_db::MemoryStore;
use wastewise_services::{AnalyticsService, Repositories};

const SECRET: &str = "analytics-handler-test-secret";

macro_rules! test_app {
    ($repos:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(Arc::new(JwtService::new(SECRET, 3600))))
                .app_data(web::Data::new(AnalyticsService::new($repos)))
                .configure(configure_routes),
        )
        .await
    };
}

fn bearer(role: UserRole) -> (&'static str, String) {
    let token = JwtService::new(SECRET, 3600)
        .create_token(&Claims::new(Uuid::new_v4(), role))
        .unwrap();
    ("Authorization", format!("Bearer {}", token))
}

fn store_error() -> AppError {
    AppError::Database("connection lost".to_string())
}

/// Payment repository whose every read fails
struct FailingPayments;

#[async_trait]
impl PaymentRepository for FailingPayments {
    async fn sum_amount(&self, _filter: &PaymentFilter) -> AppResult<Decimal> {
        Err(store_error())
    }

    async fn monthly_revenue(&self, _window: &DateWindow) -> AppResult<Vec<MonthlyRevenue>> {
        Err(store_error())
    }

    async fn totals_by_status(&self) -> AppResult<Vec<PaymentStatusTotal>> {
        Err(store_error())
    }

    async fn revenue_by_method(&self) -> AppResult<Vec<MethodRevenue>> {
        Err(store_error())
    }

    async fn export(&self, _window: &DateWindow) -> AppResult<Vec<PaymentExport>> {
        Err(store_error())
    }
}

/// Export sources that must never be reached
struct UntouchableStore;

#[async_trait]
impl CollectionRepository for UntouchableStore {
    async fn count(&self, _filter: &CollectionFilter) -> AppResult<i64> {
        Err(store_error())
    }

    async fn totals_by_waste_type(
        &self,
        _filter: &CollectionFilter,
    ) -> AppResult<Vec<WasteTypeTotal>> {
        Err(store_error())
    }

    async fn totals_by_bucket(
        &self,
        _filter: &CollectionFilter,
        _bucket: TimeBucket,
    ) -> AppResult<Vec<WasteTrendPoint>> {
        Err(store_error())
    }

    async fn collector_totals(
        &self,
        _filter: &CollectionFilter,
    ) -> AppResult<Vec<CollectorPerformance>> {
        Err(store_error())
    }

    async fn export(&self, _window: &DateWindow) -> AppResult<Vec<CollectionExport>> {
        Err(store_error())
    }
}

#[async_trait]
impl PickupRepository for UntouchableStore {
    async fn count(&self, _filter: &PickupFilter) -> AppResult<i64> {
        Err(store_error())
    }

    async fn count_by_status(&self) -> AppResult<Vec<GroupCount<PickupStatus>>> {
        Err(store_error())
    }

    async fn export(&self, _window: &DateWindow) -> AppResult<Vec<PickupExport>> {
        Err(store_error())
    }
}

fn untouchable_exports() -> Repositories {
    let mut repos = Repositories::memory(MemoryStore::new());
    repos.collections = Arc::new(UntouchableStore);
    repos.pickups = Arc::new(UntouchableStore);
    repos.payments = Arc::new(FailingPayments);
    repos
}

fn failing_payments() -> Repositories {
    let mut repos = Repositories::memory(MemoryStore::new());
    repos.payments = Arc::new(FailingPayments);
    repos
}

#[actix_web::test]
async fn test_health_is_public() {
    let app = test_app!(Repositories::memory(MemoryStore::new()));

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "healthy");
}

#[actix_web::test]
async fn test_dashboard_counts_only_admin() {
    let store = MemoryStore::new();
    store.insert_user(User {
        role: UserRole::Admin,
        created_at: Utc::now() - Duration::days(400),
        ..Default::default()
    });
    let app = test_app!(Repositories::memory(store));

    let req = test::TestRequest::get()
        .uri("/api/analytics/dashboard")
        .insert_header(bearer(UserRole::Admin))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    let data = &body["data"];
    assert_eq!(data["bins"]["total"], 0);
    assert_eq!(data["collections"]["thisMonth"], 0);
    assert_eq!(data["routes"]["active"], 0);
    assert_eq!(data["revenue"]["total"], 0.0);
    assert_eq!(data["users"]["total"], 1);
    assert_eq!(data["users"]["admins"], 1);
    assert_eq!(data["users"]["residents"], 0);
    assert_eq!(data["users"]["change"], 0.0);
}

#[actix_web::test]
async fn test_waste_statistics_endpoint() {
    let store = MemoryStore::new();
    for (waste_type, weight) in [(WasteType::Recyclable, 10.0), (WasteType::Organic, 5.0)] {
        store.insert_collection(CollectionRecord {
            waste_type,
            waste_weight: weight,
            ..Default::default()
        });
    }
    let app = test_app!(Repositories::memory(store));

    let req = test::TestRequest::get()
        .uri("/api/analytics/waste")
        .insert_header(bearer(UserRole::Resident))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let by_type = body["data"]["byType"].as_array().unwrap();
    assert_eq!(by_type.len(), 2);
    let total: f64 = by_type
        .iter()
        .map(|t| t["totalWeight"].as_f64().unwrap())
        .sum();
    assert_eq!(total, 15.0);
    let trend_total: f64 = body["data"]["trends"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["totalWeight"].as_f64().unwrap())
        .sum();
    assert_eq!(trend_total, 15.0);
}

#[actix_web::test]
async fn test_waste_statistics_rejects_bad_date() {
    let app = test_app!(Repositories::memory(MemoryStore::new()));

    let req = test::TestRequest::get()
        .uri("/api/analytics/waste?startDate=yesterday")
        .insert_header(bearer(UserRole::Operator))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("yesterday"));
}

#[actix_web::test]
async fn test_area_statistics_order() {
    let store = MemoryStore::new();
    for i in 0..15 {
        store.insert_route(Route {
            area: if i < 10 { "A" } else { "B" }.to_string(),
            ..Default::default()
        });
    }
    let app = test_app!(Repositories::memory(store));

    let req = test::TestRequest::get()
        .uri("/api/analytics/areas")
        .insert_header(bearer(UserRole::Collector))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let areas = body["data"]["routesByArea"].as_array().unwrap();
    assert_eq!(areas[0]["_id"], "A");
    assert_eq!(areas[0]["routeCount"], 10);
    assert_eq!(areas[1]["_id"], "B");
    assert_eq!(areas[1]["routeCount"], 5);
}

#[actix_web::test]
async fn test_export_rejects_unknown_type_before_reading() {
    let app = test_app!(untouchable_exports());

    for uri in [
        "/api/analytics/export?type=bogus",
        "/api/analytics/export",
        "/api/analytics/export?type=bogus&startDate=not-a-date",
    ] {
        let req = test::TestRequest::get()
            .uri(uri)
            .insert_header(bearer(UserRole::Admin))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400, "{}", uri);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body,
            serde_json::json!({"success": false, "message": "Invalid export type"})
        );
    }
}

#[actix_web::test]
async fn test_export_payments_bare_array() {
    let store = MemoryStore::new();
    let user = User {
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
        ..Default::default()
    };
    let user_id = user.id;
    store.insert_user(user);
    store.insert_payment(Payment {
        user: Some(user_id),
        status: PaymentStatus::Completed,
        amount: Decimal::new(2500, 2),
        ..Default::default()
    });
    let app = test_app!(Repositories::memory(store));

    let req = test::TestRequest::get()
        .uri("/api/analytics/export?type=payments")
        .insert_header(bearer(UserRole::Authority))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["user"]["name"], "Ada");
    assert_eq!(rows[0]["amount"], 25.0);
}

#[actix_web::test]
async fn test_payment_failure_is_500_without_data() {
    let app = test_app!(failing_payments());

    let req = test::TestRequest::get()
        .uri("/api/analytics/dashboard")
        .insert_header(bearer(UserRole::Operator))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 500);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("connection lost"));
    assert_eq!(body["error"], body["message"]);
    assert!(body.get("data").is_none());

    for uri in [
        "/api/analytics/financial",
        "/api/analytics/export?type=payments",
    ] {
        let req = test::TestRequest::get()
            .uri(uri)
            .insert_header(bearer(UserRole::Admin))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 500, "{}", uri);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["message"].as_str().unwrap().contains("connection lost"));
        assert!(body.get("data").is_none());
    }

    // Reporters that never read payments still answer
    let req = test::TestRequest::get()
        .uri("/api/analytics/engagement")
        .insert_header(bearer(UserRole::Admin))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
}

#[actix_web::test]
async fn test_financial_year_validation() {
    let app = test_app!(Repositories::memory(MemoryStore::new()));

    for (uri, expected) in [
        ("/api/analytics/financial?year=2025", 200),
        ("/api/analytics/financial?year=1900", 400),
        ("/api/analytics/financial?year=soon", 400),
    ] {
        let req = test::TestRequest::get()
            .uri(uri)
            .insert_header(bearer(UserRole::Authority))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), expected, "{}", uri);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], expected == 200);
    }
}

#[actix_web::test]
async fn test_role_matrix() {
    let app = test_app!(Repositories::memory(MemoryStore::new()));

    for (uri, role, expected) in [
        ("/api/analytics/dashboard", UserRole::Resident, 403),
        ("/api/analytics/dashboard", UserRole::Operator, 200),
        ("/api/analytics/efficiency", UserRole::Collector, 403),
        ("/api/analytics/efficiency", UserRole::Authority, 200),
        ("/api/analytics/engagement", UserRole::Operator, 200),
        ("/api/analytics/financial", UserRole::Operator, 403),
        ("/api/analytics/export?type=pickups", UserRole::Operator, 403),
        ("/api/analytics/export?type=pickups", UserRole::Admin, 200),
        ("/api/analytics/areas", UserRole::Resident, 200),
    ] {
        let req = test::TestRequest::get()
            .uri(uri)
            .insert_header(bearer(role))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), expected, "{} as {}", uri, role);
    }
}

#[actix_web::test]
async fn test_missing_token_is_401() {
    let app = test_app!(Repositories::memory(MemoryStore::new()));

    for uri in [
        "/api/analytics/waste",
        "/api/analytics/waste?startDate=yesterday",
        "/api/analytics/export?type=bogus",
        "/api/analytics/financial?year=soon",
        "/api/analytics/financial?year=1800",
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401, "{}", uri);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
    }
}

#[actix_web::test]
async fn test_role_is_checked_before_query() {
    let app = test_app!(Repositories::memory(MemoryStore::new()));

    for uri in [
        "/api/analytics/financial?year=soon",
        "/api/analytics/export?type=bogus",
    ] {
        let req = test::TestRequest::get()
            .uri(uri)
            .insert_header(bearer(UserRole::Resident))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 403, "{}", uri);
    }
}
