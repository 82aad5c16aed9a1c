//! Shaped report payloads
//!
//! These are the `data` objects of the analytics endpoints.

use rust_decimal::Decimal;
use serde::Serialize;
use wastewise_core::aggregates::{
    AreaRoutes, BinUtilization, CollectorPerformance, GroupCount, LocationBins, MethodRevenue,
    MonthlyRevenue, PaymentStatusTotal, RouteEfficiency, WasteTrendPoint, WasteTypeTotal,
};
use wastewise_core::models::{PickupStatus, TicketStatus, UserRole};

/// Dashboard summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub bins: BinSummary,
    pub collections: CollectionSummary,
    pub pickups: PickupSummary,
    pub tickets: TicketSummary,
    pub revenue: RevenueSummary,
    pub routes: RouteSummary,
    pub users: UserSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BinSummary {
    pub total: i64,
    pub active: i64,
    pub needing_collection: i64,
    pub change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSummary {
    pub total: i64,
    pub today: i64,
    pub this_month: i64,
    pub last_month: i64,
    pub change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupSummary {
    pub total: i64,
    pub pending: i64,
    pub this_month: i64,
    pub last_month: i64,
    pub change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketSummary {
    pub total: i64,
    pub open: i64,
    pub this_month: i64,
    pub last_month: i64,
    pub change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueSummary {
    pub total: Decimal,
    pub this_month: Decimal,
    pub change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSummary {
    pub active: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSummary {
    pub total: i64,
    pub admins: i64,
    pub collectors: i64,
    pub residents: i64,
    pub operators: i64,
    pub authorities: i64,
    pub change: f64,
}

impl UserSummary {
    /// Fill the role breakdown from grouped counts; missing roles are 0
    pub fn from_roles(total: i64, roles: &[GroupCount<UserRole>], change: f64) -> Self {
        let count = |role: UserRole| {
            roles
                .iter()
                .filter(|g| g.key == role)
                .map(|g| g.count)
                .sum::<i64>()
        };

        Self {
            total,
            admins: count(UserRole::Admin),
            collectors: count(UserRole::Collector),
            residents: count(UserRole::Resident),
            operators: count(UserRole::Operator),
            authorities: count(UserRole::Authority),
            change,
        }
    }
}

/// Waste statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteStatistics {
    pub by_type: Vec<WasteTypeTotal>,
    pub trends: Vec<WasteTrendPoint>,
}

/// Route averages; serializes as `{}` when no route was measured
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RouteEfficiencyReport {
    #[serde(flatten)]
    pub stats: Option<RouteEfficiency>,
}

/// Efficiency metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EfficiencyMetrics {
    pub route_efficiency: RouteEfficiencyReport,
    pub collector_performance: Vec<CollectorPerformance>,
    pub bin_utilization: Vec<BinUtilization>,
}

/// Financial analytics for one calendar year
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialAnalytics {
    pub monthly_revenue: Vec<MonthlyRevenue>,
    pub payment_status: Vec<PaymentStatusTotal>,
    pub revenue_by_type: Vec<MethodRevenue>,
}

/// Area statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaStatistics {
    pub routes_by_area: Vec<AreaRoutes>,
    pub bins_by_location: Vec<LocationBins>,
}

/// Engagement statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementStatistics {
    pub users_by_role: Vec<GroupCount<UserRole>>,
    pub active_users: i64,
    pub pickup_request_stats: Vec<GroupCount<PickupStatus>>,
    pub ticket_stats: Vec<GroupCount<TicketStatus>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_roles_default_to_zero() {
        let roles = vec![GroupCount::new(UserRole::Admin, 2), GroupCount::new(UserRole::Resident, 7)];
        let users = UserSummary::from_roles(9, &roles, 0.0);
        assert_eq!(users.admins, 2);
        assert_eq!(users.residents, 7);
        assert_eq!(users.collectors, 0);
        assert_eq!(users.authorities, 0);
    }

    #[test]
    fn test_empty_route_efficiency_is_empty_object() {
        let json = serde_json::to_value(RouteEfficiencyReport::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));

        let json = serde_json::to_value(RouteEfficiencyReport {
            stats: Some(RouteEfficiency {
                avg_duration: 30.0,
                avg_distance: 5.0,
                avg_completion_rate: 50.0,
                total_routes: 2,
            }),
        })
        .unwrap();
        assert_eq!(json["totalRoutes"], 2);
        assert_eq!(json["avgCompletionRate"], 50.0);
    }
}
