//! Domain models for WasteWise
//!
//! Entities read by the analytics reporters. Reporters never mutate them.

pub mod bin;
pub mod collection;
pub mod payment;
pub mod pickup;
pub mod route;
pub mod ticket;
pub mod user;

pub use bin::{Bin, BinLocation, BinStatus, WasteType, COLLECTION_THRESHOLD};
pub use collection::CollectionRecord;
pub use payment::{Invoice, Payment, PaymentMethod, PaymentStatus};
pub use pickup::{PickupRequest, PickupStatus};
pub use route::{Route, RouteStatus};
pub use ticket::{Ticket, TicketStatus};
pub use user::{Principal, User, UserRef, UserRole};
