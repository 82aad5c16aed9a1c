//! WasteWise Database Layer
//!
//! Read-only access to the entity collections consumed by the analytics
//! reporters. It includes:
//!
//! - Connection pool management and embedded migrations with sqlx
//! - PostgreSQL implementations of every repository trait
//! - An in-memory store implementing the same traits

pub mod memory;
pub mod pool;
pub mod repositories;
mod sql;

pub use memory::MemoryStore;
pub use pool::{create_pool, run_migrations};
pub use repositories::*;

// Re-export commonly used types
pub use sqlx::PgPool;
pub use wastewise_core::{AppError, AppResult};
