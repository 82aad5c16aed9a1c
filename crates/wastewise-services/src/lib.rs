//! Analytics services for WasteWise
//!
//! Read-only reporters over bins, collections, pickup requests, tickets,
//! payments, routes and users. Each reporter fans its store reads out
//! concurrently and shapes the results into the payloads in [`reports`].
//!
//! # Services
//!
//! - `AnalyticsService` - dashboard, waste, efficiency, financial, area,
//!   engagement and export reports

pub mod analytics;
pub mod reports;

pub use analytics::AnalyticsService;

use std::sync::Arc;
use wastewise_core::traits::{
    BinRepository, CollectionRepository, PaymentRepository, PickupRepository, RouteRepository,
    TicketRepository, UserRepository,
};
use wastewise_db::{
    MemoryStore, PgBinRepository, PgCollectionRepository, PgPaymentRepository, PgPickupRepository,
    PgPool, PgRouteRepository, PgTicketRepository, PgUserRepository,
};

/// One repository handle per entity collection
#[derive(Clone)]
pub struct Repositories {
    pub bins: Arc<dyn BinRepository>,
    pub collections: Arc<dyn CollectionRepository>,
    pub pickups: Arc<dyn PickupRepository>,
    pub tickets: Arc<dyn TicketRepository>,
    pub payments: Arc<dyn PaymentRepository>,
    pub routes: Arc<dyn RouteRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Repositories {
    /// PostgreSQL repositories sharing one pool
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            bins: Arc::new(PgBinRepository::new(pool.clone())),
            collections: Arc::new(PgCollectionRepository::new(pool.clone())),
            pickups: Arc::new(PgPickupRepository::new(pool.clone())),
            tickets: Arc::new(PgTicketRepository::new(pool.clone())),
            payments: Arc::new(PgPaymentRepository::new(pool.clone())),
            routes: Arc::new(PgRouteRepository::new(pool.clone())),
            users: Arc::new(PgUserRepository::new(pool)),
        }
    }

    /// Every collection served by a single store
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: BinRepository
            + CollectionRepository
            + PickupRepository
            + TicketRepository
            + PaymentRepository
            + RouteRepository
            + UserRepository
            + 'static,
    {
        Self {
            bins: store.clone(),
            collections: store.clone(),
            pickups: store.clone(),
            tickets: store.clone(),
            payments: store.clone(),
            routes: store.clone(),
            users: store,
        }
    }

    pub fn memory(store: MemoryStore) -> Self {
        Self::from_store(Arc::new(store))
    }
}

/// Report limits
pub mod constants {
    /// Collectors listed in the efficiency leaderboard
    pub const COLLECTOR_LEADERBOARD_LIMIT: usize = 10;

    /// Bin locations listed in the area statistics
    pub const LOCATION_LIMIT: usize = 20;
}
