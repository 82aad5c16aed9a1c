//! WasteWise analytics server
//!
//! Serves the read-only reporting endpoints under `/api/analytics` from
//! either PostgreSQL or the in-memory store.

use actix_cors::Cors;
use actix_web::{http::header, middleware, web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wastewise_api::configure_routes;
use wastewise_auth::JwtService;
use wastewise_core::config::LoggingConfig;
use wastewise_core::AppConfig;
use wastewise_db::{create_pool, run_migrations, MemoryStore};
use wastewise_services::{AnalyticsService, Repositories};

/// Initialize tracing/logging
fn init_tracing(config: &LoggingConfig) {
    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| config.level.clone());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "wastewise={level},wastewise_api={level},wastewise_services={level},wastewise_db={level},wastewise_auth={level},actix_web=info,sqlx=warn",
            level = level
        ))
    });

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.json {
        registry.with(fmt::layer().json().with_target(true)).init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init();
    }
}

async fn build_repositories(config: &AppConfig) -> anyhow::Result<Repositories> {
    if config.database.is_memory() {
        warn!("Using the in-memory store; data is not persisted");
        return Ok(Repositories::memory(MemoryStore::new()));
    }

    info!("Connecting to database...");
    let pool = create_pool(&config.database)
        .await
        .context("Failed to create database pool")?;

    info!(
        "Database connection established with {} max connections",
        config.database.max_connections
    );

    if config.database.run_migrations {
        run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;
    }

    Ok(Repositories::postgres(pool))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    init_tracing(&config.logging);

    info!(
        "Starting WasteWise analytics v{}",
        env!("CARGO_PKG_VERSION")
    );

    let jwt_service = Arc::new(JwtService::from_config(&config.auth));
    info!(
        "JWT service configured with {} second token expiration",
        jwt_service.expiration_secs()
    );

    let analytics = web::Data::new(AnalyticsService::new(build_repositories(&config).await?));
    let jwt_data = web::Data::new(jwt_service);
    let cors_origins = config.cors_origins();

    let bind_addr = config.server_addr();
    info!(
        "Starting HTTP server on {} with {} workers",
        bind_addr, config.server.workers
    );

    HttpServer::new(move || {
        let origins = cors_origins.clone();
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _req_head| {
                origin
                    .to_str()
                    .map(|o| origins.iter().any(|allowed| allowed == o))
                    .unwrap_or(false)
            })
            .allowed_methods(vec!["GET", "OPTIONS"])
            .allowed_headers(vec![
                header::AUTHORIZATION,
                header::ACCEPT,
                header::CONTENT_TYPE,
                header::COOKIE,
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(analytics.clone())
            .app_data(jwt_data.clone())
            .wrap(cors)
            .wrap(TracingLogger::default())
            .wrap(middleware::Compress::default())
            .wrap(middleware::NormalizePath::trim())
            .configure(configure_routes)
    })
    .workers(config.server.workers)
    .bind(&bind_addr)
    .with_context(|| format!("Failed to bind {}", bind_addr))?
    .run()
    .await
    .context("HTTP server failed")
}
