//! Query predicates for the reporting repositories
//!
//! Each filter is a plain value: repositories translate it into SQL, the
//! in-memory store evaluates it with `matches`. Role narrowing is applied
//! through [`ScopedFilter`] before a filter reaches any repository.

use crate::models::{
    Bin, BinStatus, CollectionRecord, Payment, PaymentStatus, PickupRequest, PickupStatus,
    Principal, Route, RouteStatus, Ticket, TicketStatus, User, COLLECTION_THRESHOLD,
};
use crate::period::DateWindow;
use uuid::Uuid;

/// Narrow a filter to what `principal` is allowed to see
pub trait ScopedFilter: Sized {
    fn scoped(self, principal: &Principal) -> Self;
}

/// Bin predicate
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BinFilter {
    pub status: Option<BinStatus>,
    /// Inclusive lower bound on fill level
    pub min_fill_level: Option<f64>,
    pub created_by: Option<Uuid>,
}

impl BinFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn active() -> Self {
        Self {
            status: Some(BinStatus::Active),
            ..Default::default()
        }
    }

    /// Active bins at or above the collection threshold
    pub fn needing_collection() -> Self {
        Self {
            status: Some(BinStatus::Active),
            min_fill_level: Some(COLLECTION_THRESHOLD),
            ..Default::default()
        }
    }

    pub fn matches(&self, bin: &Bin) -> bool {
        self.status.map_or(true, |s| bin.status == s)
            && self.min_fill_level.map_or(true, |min| bin.fill_level >= min)
            && self.created_by.map_or(true, |id| bin.created_by == Some(id))
    }
}

impl ScopedFilter for BinFilter {
    fn scoped(mut self, principal: &Principal) -> Self {
        if principal.is_resident() {
            self.created_by = Some(principal.id);
        }
        self
    }
}

/// Collection record predicate on `collectionDate`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CollectionFilter {
    pub collected: DateWindow,
}

impl CollectionFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn collected_in(window: DateWindow) -> Self {
        Self { collected: window }
    }

    pub fn matches(&self, record: &CollectionRecord) -> bool {
        self.collected.contains(record.collection_date)
    }
}

/// Pickup request predicate; the window applies to `createdAt`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PickupFilter {
    pub status: Option<PickupStatus>,
    pub created: DateWindow,
    pub requested_by: Option<Uuid>,
}

impl PickupFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn pending() -> Self {
        Self {
            status: Some(PickupStatus::Pending),
            ..Default::default()
        }
    }

    pub fn created_in(window: DateWindow) -> Self {
        Self {
            created: window,
            ..Default::default()
        }
    }

    pub fn matches(&self, pickup: &PickupRequest) -> bool {
        self.status.map_or(true, |s| pickup.status == s)
            && self.created.contains(pickup.created_at)
            && self
                .requested_by
                .map_or(true, |id| pickup.requested_by == Some(id))
    }
}

impl ScopedFilter for PickupFilter {
    fn scoped(mut self, principal: &Principal) -> Self {
        if principal.is_resident() {
            self.requested_by = Some(principal.id);
        }
        self
    }
}

/// Ticket predicate; an empty status list matches every status
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TicketFilter {
    pub statuses: Vec<TicketStatus>,
    pub created: DateWindow,
}

impl TicketFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn open() -> Self {
        Self {
            statuses: TicketStatus::OPEN.to_vec(),
            ..Default::default()
        }
    }

    pub fn created_in(window: DateWindow) -> Self {
        Self {
            created: window,
            ..Default::default()
        }
    }

    pub fn matches(&self, ticket: &Ticket) -> bool {
        (self.statuses.is_empty() || self.statuses.contains(&ticket.status))
            && self.created.contains(ticket.created_at)
    }
}

/// Payment predicate; the window applies to `createdAt`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PaymentFilter {
    pub status: Option<PaymentStatus>,
    pub created: DateWindow,
}

impl PaymentFilter {
    pub fn all() -> Self {
        Self::default()
    }

    /// Completed payments created inside `window`
    pub fn completed_in(window: DateWindow) -> Self {
        Self {
            status: Some(PaymentStatus::Completed),
            created: window,
        }
    }

    pub fn matches(&self, payment: &Payment) -> bool {
        self.status.map_or(true, |s| payment.status == s) && self.created.contains(payment.created_at)
    }
}

/// Route predicate; an empty status list matches every status
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteFilter {
    pub statuses: Vec<RouteStatus>,
}

impl RouteFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_statuses(statuses: &[RouteStatus]) -> Self {
        Self {
            statuses: statuses.to_vec(),
        }
    }

    pub fn matches(&self, route: &Route) -> bool {
        self.statuses.is_empty() || self.statuses.contains(&route.status)
    }
}

/// User predicate over creation and last-login instants
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UserFilter {
    pub created: DateWindow,
    pub last_login: DateWindow,
}

impl UserFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn created_in(window: DateWindow) -> Self {
        Self {
            created: window,
            ..Default::default()
        }
    }

    pub fn logged_in(window: DateWindow) -> Self {
        Self {
            last_login: window,
            ..Default::default()
        }
    }

    pub fn matches(&self, user: &User) -> bool {
        self.created.contains(user.created_at) && self.last_login.contains_opt(user.last_login)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;
    use chrono::{Duration, Utc};

    #[test]
    fn test_resident_scoping_sets_owner() {
        let resident = Principal::new(Uuid::new_v4(), UserRole::Resident);

        let bins = BinFilter::active().scoped(&resident);
        assert_eq!(bins.created_by, Some(resident.id));
        assert_eq!(bins.status, Some(BinStatus::Active));

        let pickups = PickupFilter::pending().scoped(&resident);
        assert_eq!(pickups.requested_by, Some(resident.id));
    }

    #[test]
    fn test_staff_scoping_is_identity() {
        for role in [UserRole::Operator, UserRole::Authority, UserRole::Admin, UserRole::Collector] {
            let p = Principal::new(Uuid::new_v4(), role);
            assert_eq!(BinFilter::needing_collection().scoped(&p), BinFilter::needing_collection());
            assert_eq!(PickupFilter::all().scoped(&p), PickupFilter::all());
        }
    }

    #[test]
    fn test_bin_filter_matches() {
        let owner = Uuid::new_v4();
        let full = Bin {
            fill_level: 80.0,
            created_by: Some(owner),
            ..Default::default()
        };
        let inactive = Bin {
            fill_level: 95.0,
            status: BinStatus::Maintenance,
            ..Default::default()
        };

        assert!(BinFilter::needing_collection().matches(&full));
        assert!(!BinFilter::needing_collection().matches(&inactive));
        assert!(BinFilter::all().matches(&inactive));

        let owned = BinFilter {
            created_by: Some(owner),
            ..Default::default()
        };
        assert!(owned.matches(&full));
        assert!(!owned.matches(&inactive));
    }

    #[test]
    fn test_ticket_filter_open_statuses() {
        let in_progress = Ticket {
            status: TicketStatus::InProgress,
            ..Default::default()
        };
        let closed = Ticket {
            status: TicketStatus::Closed,
            ..Default::default()
        };
        assert!(TicketFilter::open().matches(&in_progress));
        assert!(!TicketFilter::open().matches(&closed));
        assert!(TicketFilter::all().matches(&closed));
    }

    #[test]
    fn test_user_filter_requires_login_inside_window() {
        let now = Utc::now();
        let recent = User {
            last_login: Some(now - Duration::days(2)),
            ..Default::default()
        };
        let never = User::default();
        let filter = UserFilter::logged_in(DateWindow::since(now - Duration::days(30)));

        assert!(filter.matches(&recent));
        assert!(!filter.matches(&never));
        assert!(UserFilter::all().matches(&never));
    }
}
