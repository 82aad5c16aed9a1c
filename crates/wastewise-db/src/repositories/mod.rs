//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in
//! wastewise-core. All queries are built at runtime so the crate compiles
//! without a live database.

pub mod bin_repo;
pub mod collection_repo;
pub mod payment_repo;
pub mod pickup_repo;
pub mod route_repo;
pub mod ticket_repo;
pub mod user_repo;

pub use bin_repo::PgBinRepository;
pub use collection_repo::PgCollectionRepository;
pub use payment_repo::PgPaymentRepository;
pub use pickup_repo::PgPickupRepository;
pub use route_repo::PgRouteRepository;
pub use ticket_repo::PgTicketRepository;
pub use user_repo::PgUserRepository;
