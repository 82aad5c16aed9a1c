//! Repository traits for the reporting layer
//!
//! Every operation is a read. Implementations live in `wastewise-db`: one
//! set over PostgreSQL, one over the in-memory store.

use crate::aggregates::{
    AreaRoutes, BinUtilization, CollectionExport, CollectorPerformance, GroupCount, LocationBins,
    MethodRevenue, MonthlyRevenue, PaymentExport, PaymentStatusTotal, PickupExport,
    RouteEfficiency, WasteTrendPoint, WasteTypeTotal,
};
use crate::filter::{
    BinFilter, CollectionFilter, PaymentFilter, PickupFilter, RouteFilter, TicketFilter,
    UserFilter,
};
use crate::models::{PickupStatus, TicketStatus, UserRole};
use crate::period::{DateWindow, TimeBucket};
use crate::AppResult;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Bin reads
#[async_trait]
pub trait BinRepository: Send + Sync {
    async fn count(&self, filter: &BinFilter) -> AppResult<i64>;

    /// Average fill level and count per waste type
    async fn utilization_by_waste_type(&self) -> AppResult<Vec<BinUtilization>>;

    /// Count and average fill level per address
    async fn group_by_location(&self) -> AppResult<Vec<LocationBins>>;
}

/// Collection record reads
#[async_trait]
pub trait CollectionRepository: Send + Sync {
    async fn count(&self, filter: &CollectionFilter) -> AppResult<i64>;

    /// Count and weight per waste type
    async fn totals_by_waste_type(&self, filter: &CollectionFilter)
        -> AppResult<Vec<WasteTypeTotal>>;

    /// Count and weight per calendar bucket of `collectionDate`
    async fn totals_by_bucket(
        &self,
        filter: &CollectionFilter,
        bucket: TimeBucket,
    ) -> AppResult<Vec<WasteTrendPoint>>;

    /// Per-collector totals joined with the collector's identity.
    /// Records without a collector are skipped.
    async fn collector_totals(&self, filter: &CollectionFilter)
        -> AppResult<Vec<CollectorPerformance>>;

    /// Records inside `window` with relations expanded, newest first
    async fn export(&self, window: &DateWindow) -> AppResult<Vec<CollectionExport>>;
}

/// Pickup request reads
#[async_trait]
pub trait PickupRepository: Send + Sync {
    async fn count(&self, filter: &PickupFilter) -> AppResult<i64>;

    async fn count_by_status(&self) -> AppResult<Vec<GroupCount<PickupStatus>>>;

    /// Requests whose `requestDate` is inside `window`, newest first
    async fn export(&self, window: &DateWindow) -> AppResult<Vec<PickupExport>>;
}

/// Ticket reads
#[async_trait]
pub trait TicketRepository: Send + Sync {
    async fn count(&self, filter: &TicketFilter) -> AppResult<i64>;

    async fn count_by_status(&self) -> AppResult<Vec<GroupCount<TicketStatus>>>;
}

/// Payment reads
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Sum of `amount` over matching payments, zero when none match
    async fn sum_amount(&self, filter: &PaymentFilter) -> AppResult<Decimal>;

    /// Completed revenue per month of `createdAt` inside `window`
    async fn monthly_revenue(&self, window: &DateWindow) -> AppResult<Vec<MonthlyRevenue>>;

    /// Count and total amount per status
    async fn totals_by_status(&self) -> AppResult<Vec<PaymentStatusTotal>>;

    /// Completed revenue per payment method
    async fn revenue_by_method(&self) -> AppResult<Vec<MethodRevenue>>;

    /// Payments created inside `window`, newest first
    async fn export(&self, window: &DateWindow) -> AppResult<Vec<PaymentExport>>;
}

/// Route reads
#[async_trait]
pub trait RouteRepository: Send + Sync {
    async fn count(&self, filter: &RouteFilter) -> AppResult<i64>;

    /// Averages over matching routes; `None` when no route matches
    async fn efficiency(&self, filter: &RouteFilter) -> AppResult<Option<RouteEfficiency>>;

    /// Route count and bin total per area
    async fn group_by_area(&self) -> AppResult<Vec<AreaRoutes>>;
}

/// User reads
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn count(&self, filter: &UserFilter) -> AppResult<i64>;

    async fn count_by_role(&self) -> AppResult<Vec<GroupCount<UserRole>>>;
}
