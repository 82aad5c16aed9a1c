//! In-memory store
//!
//! Implements every repository trait over plain vectors guarded by a
//! `parking_lot::RwLock`. Selected with the `memory://` database URL and
//! used by the service and endpoint tests. Predicates are evaluated with the
//! filters' own `matches`, so semantics stay aligned with the SQL versions.

use async_trait::async_trait;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;
use wastewise_core::{
    aggregates::{
        AreaRoutes, BinRef, BinUtilization, CollectionExport, CollectorPerformance, GroupCount,
        LocationBins, MethodRevenue, MonthlyRevenue, PaymentExport, PaymentStatusTotal,
        PickupExport, RouteEfficiency, RouteRef, WasteTrendPoint, WasteTypeTotal,
    },
    filter::{
        BinFilter, CollectionFilter, PaymentFilter, PickupFilter, RouteFilter, TicketFilter,
        UserFilter,
    },
    models::{
        Bin, CollectionRecord, Payment, PaymentStatus, PickupRequest, PickupStatus, Route, Ticket,
        TicketStatus, User, UserRef, UserRole, WasteType,
    },
    period::{BucketKey, DateWindow, TimeBucket},
    traits::{
        BinRepository, CollectionRepository, PaymentRepository, PickupRepository,
        RouteRepository, TicketRepository, UserRepository,
    },
    AppResult,
};
use chrono::Datelike;

#[derive(Debug, Default)]
struct Tables {
    bins: Vec<Bin>,
    collections: Vec<CollectionRecord>,
    pickups: Vec<PickupRequest>,
    tickets: Vec<Ticket>,
    payments: Vec<Payment>,
    routes: Vec<Route>,
    users: Vec<User>,
}

impl Tables {
    fn user_ref(&self, id: Option<Uuid>) -> Option<UserRef> {
        let id = id?;
        self.users.iter().find(|u| u.id == id).map(UserRef::from)
    }
}

/// Shared in-memory entity collections
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bin
    pub fn insert_bin(&self, bin: Bin) {
        self.tables.write().bins.push(bin);
    }

    /// Add a collection record
    pub fn insert_collection(&self, record: CollectionRecord) {
        self.tables.write().collections.push(record);
    }

    /// Add a pickup request
    pub fn insert_pickup(&self, pickup: PickupRequest) {
        self.tables.write().pickups.push(pickup);
    }

    /// Add a ticket
    pub fn insert_ticket(&self, ticket: Ticket) {
        self.tables.write().tickets.push(ticket);
    }

    /// Add a payment
    pub fn insert_payment(&self, payment: Payment) {
        self.tables.write().payments.push(payment);
    }

    /// Add a route
    pub fn insert_route(&self, route: Route) {
        self.tables.write().routes.push(route);
    }

    /// Add a user
    pub fn insert_user(&self, user: User) {
        self.tables.write().users.push(user);
    }
}

fn count_where<T>(items: &[T], pred: impl Fn(&T) -> bool) -> i64 {
    items.iter().filter(|item| pred(item)).count() as i64
}

fn mean(sum: f64, n: usize) -> f64 {
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

#[async_trait]
impl BinRepository for MemoryStore {
    async fn count(&self, filter: &BinFilter) -> AppResult<i64> {
        Ok(count_where(&self.tables.read().bins, |b| filter.matches(b)))
    }

    async fn utilization_by_waste_type(&self) -> AppResult<Vec<BinUtilization>> {
        let tables = self.tables.read();
        let mut groups: BTreeMap<WasteType, (f64, usize)> = BTreeMap::new();
        for bin in &tables.bins {
            let entry = groups.entry(bin.waste_type).or_default();
            entry.0 += bin.fill_level;
            entry.1 += 1;
        }

        Ok(groups
            .into_iter()
            .map(|(waste_type, (sum, n))| BinUtilization {
                waste_type,
                avg_fill_level: mean(sum, n),
                count: n as i64,
            })
            .collect())
    }

    async fn group_by_location(&self) -> AppResult<Vec<LocationBins>> {
        let tables = self.tables.read();
        let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
        for bin in &tables.bins {
            let entry = groups.entry(bin.location.address.as_str()).or_default();
            entry.0 += bin.fill_level;
            entry.1 += 1;
        }

        Ok(groups
            .into_iter()
            .map(|(address, (sum, n))| LocationBins {
                address: address.to_string(),
                bin_count: n as i64,
                avg_fill_level: mean(sum, n),
            })
            .collect())
    }
}

#[async_trait]
impl CollectionRepository for MemoryStore {
    async fn count(&self, filter: &CollectionFilter) -> AppResult<i64> {
        Ok(count_where(&self.tables.read().collections, |c| {
            filter.matches(c)
        }))
    }

    async fn totals_by_waste_type(
        &self,
        filter: &CollectionFilter,
    ) -> AppResult<Vec<WasteTypeTotal>> {
        let tables = self.tables.read();
        let mut groups: BTreeMap<WasteType, (i64, f64)> = BTreeMap::new();
        for record in tables.collections.iter().filter(|c| filter.matches(c)) {
            let entry = groups.entry(record.waste_type).or_default();
            entry.0 += 1;
            entry.1 += record.waste_weight;
        }

        Ok(groups
            .into_iter()
            .map(|(waste_type, (count, total_weight))| WasteTypeTotal {
                waste_type,
                count,
                total_weight,
            })
            .collect())
    }

    async fn totals_by_bucket(
        &self,
        filter: &CollectionFilter,
        bucket: TimeBucket,
    ) -> AppResult<Vec<WasteTrendPoint>> {
        let tables = self.tables.read();
        let mut groups: HashMap<BucketKey, (i64, f64)> = HashMap::new();
        for record in tables.collections.iter().filter(|c| filter.matches(c)) {
            let entry = groups.entry(bucket.key(record.collection_date)).or_default();
            entry.0 += 1;
            entry.1 += record.waste_weight;
        }

        Ok(groups
            .into_iter()
            .map(|(bucket, (count, total_weight))| WasteTrendPoint {
                bucket,
                count,
                total_weight,
            })
            .collect())
    }

    async fn collector_totals(
        &self,
        filter: &CollectionFilter,
    ) -> AppResult<Vec<CollectorPerformance>> {
        let tables = self.tables.read();
        let mut groups: HashMap<Uuid, (i64, f64)> = HashMap::new();
        for record in tables.collections.iter().filter(|c| filter.matches(c)) {
            if let Some(collector) = record.collector {
                let entry = groups.entry(collector).or_default();
                entry.0 += 1;
                entry.1 += record.waste_weight;
            }
        }

        Ok(groups
            .into_iter()
            .map(|(collector_id, (count, total_weight))| {
                let identity = tables.user_ref(Some(collector_id));
                CollectorPerformance {
                    collector_id,
                    collections_completed: count,
                    total_weight,
                    avg_weight: mean(total_weight, count as usize),
                    collector_name: identity.as_ref().map(|u| u.name.clone()),
                    collector_email: identity.map(|u| u.email),
                }
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn export(&self, window: &DateWindow) -> AppResult<Vec<CollectionExport>> {
        let tables = self.tables.read();
        let mut records: Vec<&CollectionRecord> = tables
            .collections
            .iter()
            .filter(|c| window.contains(c.collection_date))
            .collect();
        records.sort_by(|a, b| {
            b.collection_date
                .cmp(&a.collection_date)
                .then(a.id.cmp(&b.id))
        });
        debug!("Exporting {} collection records", records.len());

        Ok(records
            .into_iter()
            .map(|c| CollectionExport {
                id: c.id,
                collection_date: c.collection_date,
                waste_type: c.waste_type,
                waste_weight: c.waste_weight,
                bin: c
                    .bin
                    .and_then(|id| tables.bins.iter().find(|b| b.id == id))
                    .map(|b| BinRef {
                        id: b.id,
                        bin_id: b.bin_id.clone(),
                        waste_type: b.waste_type,
                        address: b.location.address.clone(),
                    }),
                collector: tables.user_ref(c.collector),
                resident: tables.user_ref(c.resident),
                route: c
                    .route
                    .and_then(|id| tables.routes.iter().find(|r| r.id == id))
                    .map(|r| RouteRef {
                        id: r.id,
                        name: r.name.clone(),
                        area: r.area.clone(),
                    }),
            })
            .collect())
    }
}

#[async_trait]
impl PickupRepository for MemoryStore {
    async fn count(&self, filter: &PickupFilter) -> AppResult<i64> {
        Ok(count_where(&self.tables.read().pickups, |p| filter.matches(p)))
    }

    async fn count_by_status(&self) -> AppResult<Vec<GroupCount<PickupStatus>>> {
        let tables = self.tables.read();
        let mut groups: BTreeMap<PickupStatus, i64> = BTreeMap::new();
        for pickup in &tables.pickups {
            *groups.entry(pickup.status).or_default() += 1;
        }
        Ok(groups.into_iter().map(|(k, n)| GroupCount::new(k, n)).collect())
    }

    async fn export(&self, window: &DateWindow) -> AppResult<Vec<PickupExport>> {
        let tables = self.tables.read();
        let mut pickups: Vec<&PickupRequest> = tables
            .pickups
            .iter()
            .filter(|p| window.contains(p.request_date))
            .collect();
        pickups.sort_by(|a, b| b.request_date.cmp(&a.request_date).then(a.id.cmp(&b.id)));

        Ok(pickups
            .into_iter()
            .map(|p| PickupExport {
                id: p.id,
                status: p.status,
                waste_type: p.waste_type,
                request_date: p.request_date,
                created_at: p.created_at,
                resident: tables.user_ref(p.requested_by),
                collector: tables.user_ref(p.collector),
            })
            .collect())
    }
}

#[async_trait]
impl TicketRepository for MemoryStore {
    async fn count(&self, filter: &TicketFilter) -> AppResult<i64> {
        Ok(count_where(&self.tables.read().tickets, |t| filter.matches(t)))
    }

    async fn count_by_status(&self) -> AppResult<Vec<GroupCount<TicketStatus>>> {
        let tables = self.tables.read();
        let mut groups: BTreeMap<TicketStatus, i64> = BTreeMap::new();
        for ticket in &tables.tickets {
            *groups.entry(ticket.status).or_default() += 1;
        }
        Ok(groups.into_iter().map(|(k, n)| GroupCount::new(k, n)).collect())
    }
}

#[async_trait]
impl PaymentRepository for MemoryStore {
    async fn sum_amount(&self, filter: &PaymentFilter) -> AppResult<Decimal> {
        Ok(self
            .tables
            .read()
            .payments
            .iter()
            .filter(|p| filter.matches(p))
            .map(|p| p.amount)
            .sum())
    }

    async fn monthly_revenue(&self, window: &DateWindow) -> AppResult<Vec<MonthlyRevenue>> {
        let filter = PaymentFilter::completed_in(*window);
        let tables = self.tables.read();
        let mut groups: BTreeMap<u32, (Decimal, i64)> = BTreeMap::new();
        for payment in tables.payments.iter().filter(|p| filter.matches(p)) {
            let entry = groups.entry(payment.created_at.month()).or_default();
            entry.0 += payment.amount;
            entry.1 += 1;
        }

        Ok(groups
            .into_iter()
            .map(|(month, (revenue, count))| MonthlyRevenue {
                month,
                revenue,
                count,
            })
            .collect())
    }

    async fn totals_by_status(&self) -> AppResult<Vec<PaymentStatusTotal>> {
        let tables = self.tables.read();
        let mut groups: BTreeMap<PaymentStatus, (i64, Decimal)> = BTreeMap::new();
        for payment in &tables.payments {
            let entry = groups.entry(payment.status).or_default();
            entry.0 += 1;
            entry.1 += payment.amount;
        }

        Ok(groups
            .into_iter()
            .map(|(status, (count, total_amount))| PaymentStatusTotal {
                status,
                count,
                total_amount,
            })
            .collect())
    }

    async fn revenue_by_method(&self) -> AppResult<Vec<MethodRevenue>> {
        let tables = self.tables.read();
        let mut groups = BTreeMap::new();
        for payment in tables.payments.iter().filter(|p| p.status.is_revenue()) {
            let entry: &mut (Decimal, i64) = groups.entry(payment.payment_method).or_default();
            entry.0 += payment.amount;
            entry.1 += 1;
        }

        Ok(groups
            .into_iter()
            .map(|(method, (revenue, count))| MethodRevenue {
                method,
                revenue,
                count,
            })
            .collect())
    }

    async fn export(&self, window: &DateWindow) -> AppResult<Vec<PaymentExport>> {
        let tables = self.tables.read();
        let mut payments: Vec<&Payment> = tables
            .payments
            .iter()
            .filter(|p| window.contains(p.created_at))
            .collect();
        payments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));

        Ok(payments
            .into_iter()
            .map(|p| PaymentExport {
                id: p.id,
                amount: p.amount,
                status: p.status,
                payment_method: p.payment_method,
                invoice: p.invoice.clone(),
                created_at: p.created_at,
                user: tables.user_ref(p.user),
            })
            .collect())
    }
}

#[async_trait]
impl RouteRepository for MemoryStore {
    async fn count(&self, filter: &RouteFilter) -> AppResult<i64> {
        Ok(count_where(&self.tables.read().routes, |r| filter.matches(r)))
    }

    async fn efficiency(&self, filter: &RouteFilter) -> AppResult<Option<RouteEfficiency>> {
        let tables = self.tables.read();
        let routes: Vec<&Route> = tables.routes.iter().filter(|r| filter.matches(r)).collect();
        if routes.is_empty() {
            return Ok(None);
        }

        let n = routes.len();
        Ok(Some(RouteEfficiency {
            avg_duration: mean(routes.iter().map(|r| r.duration).sum(), n),
            avg_distance: mean(routes.iter().map(|r| r.distance).sum(), n),
            avg_completion_rate: mean(routes.iter().map(|r| r.completion_rate()).sum(), n),
            total_routes: n as i64,
        }))
    }

    async fn group_by_area(&self) -> AppResult<Vec<AreaRoutes>> {
        let tables = self.tables.read();
        let mut groups: BTreeMap<&str, (i64, i64)> = BTreeMap::new();
        for route in &tables.routes {
            let entry = groups.entry(route.area.as_str()).or_default();
            entry.0 += 1;
            entry.1 += route.bins.len() as i64;
        }

        Ok(groups
            .into_iter()
            .map(|(area, (route_count, total_bins))| AreaRoutes {
                area: area.to_string(),
                route_count,
                total_bins,
            })
            .collect())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn count(&self, filter: &UserFilter) -> AppResult<i64> {
        Ok(count_where(&self.tables.read().users, |u| filter.matches(u)))
    }

    async fn count_by_role(&self) -> AppResult<Vec<GroupCount<UserRole>>> {
        let tables = self.tables.read();
        let mut groups: BTreeMap<UserRole, i64> = BTreeMap::new();
        for user in &tables.users {
            *groups.entry(user.role).or_default() += 1;
        }
        Ok(groups.into_iter().map(|(k, n)| GroupCount::new(k, n)).collect())
    }
}
