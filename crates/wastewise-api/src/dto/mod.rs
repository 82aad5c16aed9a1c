//! Data Transfer Objects (DTOs) for API requests and responses

pub mod analytics;
pub mod common;

pub use analytics::*;
pub use common::*;
