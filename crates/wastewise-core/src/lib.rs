//! WasteWise Core Library
//!
//! Foundational types for the WasteWise analytics service:
//!
//! - Domain models (Bin, CollectionRecord, Payment, etc.)
//! - Query filters and role scoping
//! - Reporting periods and time buckets
//! - Repository traits and the grouped rows they return
//! - Unified error handling with HTTP response mapping
//! - Application configuration

pub mod aggregates;
pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod period;
pub mod traits;

pub use config::AppConfig;
pub use error::AppError;
pub use filter::ScopedFilter;
pub use models::Principal;
pub use period::{DateWindow, ReportingPeriods, TimeBucket};

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
