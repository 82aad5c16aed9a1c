//! Analytics reporters
//!
//! Every reporter dispatches its store reads concurrently and joins them with
//! `tokio::try_join!`: the first failing read fails the whole report and no
//! partial result is returned. Stores return groups unordered; ordering and
//! truncation happen here so every report is a pure function of store state
//! and parameters.

use crate::constants::{COLLECTOR_LEADERBOARD_LIMIT, LOCATION_LIMIT};
use crate::reports::{
    AreaStatistics, BinSummary, CollectionSummary, DashboardSummary, EfficiencyMetrics,
    EngagementStatistics, FinancialAnalytics, PickupSummary, RevenueSummary,
    RouteEfficiencyReport, RouteSummary, TicketSummary, UserSummary, WasteStatistics,
};
use crate::Repositories;
use chrono::{DateTime, Datelike, Utc};
use rust_decimal::prelude::ToPrimitive;
use tracing::{debug, instrument};
use wastewise_core::{
    aggregates::{percentage_change, ExportKind, ExportRecords},
    filter::{
        BinFilter, CollectionFilter, PaymentFilter, PickupFilter, RouteFilter, TicketFilter,
        UserFilter,
    },
    models::{Principal, RouteStatus},
    period::{year_window, DateWindow, ReportingPeriods, TimeBucket},
    AppResult, ScopedFilter,
};

/// Read-only analytics over the entity repositories
#[derive(Clone)]
pub struct AnalyticsService {
    repos: Repositories,
}

impl AnalyticsService {
    /// Create a new analytics service
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Dashboard summary for `principal` as of now
    pub async fn dashboard_stats(&self, principal: &Principal) -> AppResult<DashboardSummary> {
        self.dashboard_stats_at(principal, Utc::now()).await
    }

    /// Dashboard summary with calendar windows derived from `now`
    #[instrument(skip(self))]
    pub async fn dashboard_stats_at(
        &self,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> AppResult<DashboardSummary> {
        let periods = ReportingPeriods::at(now);
        debug!("Building dashboard summary");

        let (bins, collections, pickups, tickets, revenue, routes, users) = tokio::try_join!(
            self.bin_summary(principal),
            self.collection_summary(&periods),
            self.pickup_summary(principal, &periods),
            self.ticket_summary(&periods),
            self.revenue_summary(&periods),
            self.route_summary(),
            self.user_summary(&periods),
        )?;

        Ok(DashboardSummary {
            bins,
            collections,
            pickups,
            tickets,
            revenue,
            routes,
            users,
        })
    }

    async fn bin_summary(&self, principal: &Principal) -> AppResult<BinSummary> {
        let bins = &self.repos.bins;
        let all = BinFilter::all().scoped(principal);
        let active = BinFilter::active().scoped(principal);
        let needing = BinFilter::needing_collection().scoped(principal);

        let (total, active, needing_collection) =
            tokio::try_join!(bins.count(&all), bins.count(&active), bins.count(&needing))?;

        Ok(BinSummary {
            total,
            active,
            needing_collection,
            // Bins have no month-over-month comparison
            change: 0.0,
        })
    }

    async fn collection_summary(&self, periods: &ReportingPeriods) -> AppResult<CollectionSummary> {
        let collections = &self.repos.collections;
        let all = CollectionFilter::all();
        let today = CollectionFilter::collected_in(periods.today);
        let this_month = CollectionFilter::collected_in(periods.this_month);
        let last_month = CollectionFilter::collected_in(periods.last_month);

        let (total, today, this_month, last_month) = tokio::try_join!(
            collections.count(&all),
            collections.count(&today),
            collections.count(&this_month),
            collections.count(&last_month),
        )?;

        Ok(CollectionSummary {
            total,
            today,
            this_month,
            last_month,
            change: percentage_change(this_month as f64, last_month as f64),
        })
    }

    async fn pickup_summary(
        &self,
        principal: &Principal,
        periods: &ReportingPeriods,
    ) -> AppResult<PickupSummary> {
        let pickups = &self.repos.pickups;
        let all = PickupFilter::all().scoped(principal);
        let pending = PickupFilter::pending().scoped(principal);
        let this_month = PickupFilter::created_in(periods.this_month).scoped(principal);
        let last_month = PickupFilter::created_in(periods.last_month).scoped(principal);

        let (total, pending, this_month, last_month) = tokio::try_join!(
            pickups.count(&all),
            pickups.count(&pending),
            pickups.count(&this_month),
            pickups.count(&last_month),
        )?;

        Ok(PickupSummary {
            total,
            pending,
            this_month,
            last_month,
            change: percentage_change(this_month as f64, last_month as f64),
        })
    }

    async fn ticket_summary(&self, periods: &ReportingPeriods) -> AppResult<TicketSummary> {
        let tickets = &self.repos.tickets;
        let all = TicketFilter::all();
        let open = TicketFilter::open();
        let this_month = TicketFilter::created_in(periods.this_month);
        let last_month = TicketFilter::created_in(periods.last_month);

        let (total, open, this_month, last_month) = tokio::try_join!(
            tickets.count(&all),
            tickets.count(&open),
            tickets.count(&this_month),
            tickets.count(&last_month),
        )?;

        Ok(TicketSummary {
            total,
            open,
            this_month,
            last_month,
            change: percentage_change(this_month as f64, last_month as f64),
        })
    }

    async fn revenue_summary(&self, periods: &ReportingPeriods) -> AppResult<RevenueSummary> {
        let payments = &self.repos.payments;
        let all = PaymentFilter::completed_in(DateWindow::unbounded());
        let this_month = PaymentFilter::completed_in(periods.this_month);

        let (total, this_month) =
            tokio::try_join!(payments.sum_amount(&all), payments.sum_amount(&this_month))?;

        // Previous-month revenue is not aggregated; the baseline is 0
        let change = percentage_change(this_month.to_f64().unwrap_or(0.0), 0.0);

        Ok(RevenueSummary {
            total,
            this_month,
            change,
        })
    }

    async fn route_summary(&self) -> AppResult<RouteSummary> {
        let active = self
            .repos
            .routes
            .count(&RouteFilter::with_statuses(&[RouteStatus::Active]))
            .await?;
        Ok(RouteSummary { active })
    }

    async fn user_summary(&self, periods: &ReportingPeriods) -> AppResult<UserSummary> {
        let users = &self.repos.users;
        let all = UserFilter::all();
        let before_month = UserFilter::created_in(DateWindow::before(periods.month_start));

        let (total, total_last_month, roles) = tokio::try_join!(
            users.count(&all),
            users.count(&before_month),
            users.count_by_role(),
        )?;

        let change = percentage_change(total as f64, total_last_month as f64);
        Ok(UserSummary::from_roles(total, &roles, change))
    }

    /// Collection totals per waste type and per time bucket
    #[instrument(skip(self))]
    pub async fn waste_statistics(
        &self,
        window: DateWindow,
        bucket: TimeBucket,
    ) -> AppResult<WasteStatistics> {
        let filter = CollectionFilter::collected_in(window);
        let collections = &self.repos.collections;

        let (mut by_type, mut trends) = tokio::try_join!(
            collections.totals_by_waste_type(&filter),
            collections.totals_by_bucket(&filter, bucket),
        )?;

        by_type.sort_by(|a, b| a.waste_type.as_str().cmp(b.waste_type.as_str()));
        trends.sort_by(|a, b| a.bucket.cmp(&b.bucket));

        debug!(
            "Waste statistics: {} types, {} buckets",
            by_type.len(),
            trends.len()
        );

        Ok(WasteStatistics { by_type, trends })
    }

    /// Efficiency metrics as of now
    pub async fn efficiency_metrics(&self) -> AppResult<EfficiencyMetrics> {
        self.efficiency_metrics_at(Utc::now()).await
    }

    /// Route averages, top collectors of the trailing period, bin fill levels
    #[instrument(skip(self))]
    pub async fn efficiency_metrics_at(&self, now: DateTime<Utc>) -> AppResult<EfficiencyMetrics> {
        let trailing = CollectionFilter::collected_in(ReportingPeriods::at(now).trailing);
        let measured = RouteFilter::with_statuses(&RouteStatus::MEASURED);

        let (route_efficiency, mut collector_performance, mut bin_utilization) = tokio::try_join!(
            self.repos.routes.efficiency(&measured),
            self.repos.collections.collector_totals(&trailing),
            self.repos.bins.utilization_by_waste_type(),
        )?;

        collector_performance.sort_by(|a, b| {
            b.collections_completed
                .cmp(&a.collections_completed)
                .then_with(|| a.collector_id.cmp(&b.collector_id))
        });
        collector_performance.truncate(COLLECTOR_LEADERBOARD_LIMIT);
        bin_utilization.sort_by(|a, b| a.waste_type.as_str().cmp(b.waste_type.as_str()));

        Ok(EfficiencyMetrics {
            route_efficiency: RouteEfficiencyReport {
                stats: route_efficiency,
            },
            collector_performance,
            bin_utilization,
        })
    }

    /// Financial analytics for `year`, or the current year when absent
    pub async fn financial_analytics(&self, year: Option<i32>) -> AppResult<FinancialAnalytics> {
        self.financial_analytics_at(year, Utc::now()).await
    }

    /// Revenue by month of `year` (default: the year of `now`), payment
    /// totals by status, completed revenue by method
    #[instrument(skip(self))]
    pub async fn financial_analytics_at(
        &self,
        year: Option<i32>,
        now: DateTime<Utc>,
    ) -> AppResult<FinancialAnalytics> {
        let window = year_window(year.unwrap_or_else(|| now.year()))?;
        let payments = &self.repos.payments;

        let (mut monthly_revenue, mut payment_status, mut revenue_by_type) = tokio::try_join!(
            payments.monthly_revenue(&window),
            payments.totals_by_status(),
            payments.revenue_by_method(),
        )?;

        monthly_revenue.sort_by_key(|m| m.month);
        payment_status.sort_by(|a, b| a.status.as_str().cmp(b.status.as_str()));
        revenue_by_type.sort_by(|a, b| a.method.as_str().cmp(b.method.as_str()));

        Ok(FinancialAnalytics {
            monthly_revenue,
            payment_status,
            revenue_by_type,
        })
    }

    /// Routes per area and the busiest bin locations
    #[instrument(skip(self))]
    pub async fn area_statistics(&self) -> AppResult<AreaStatistics> {
        let (mut routes_by_area, mut bins_by_location) = tokio::try_join!(
            self.repos.routes.group_by_area(),
            self.repos.bins.group_by_location(),
        )?;

        routes_by_area.sort_by(|a, b| {
            b.route_count
                .cmp(&a.route_count)
                .then_with(|| a.area.cmp(&b.area))
        });
        bins_by_location.sort_by(|a, b| {
            b.bin_count
                .cmp(&a.bin_count)
                .then_with(|| a.address.cmp(&b.address))
        });
        bins_by_location.truncate(LOCATION_LIMIT);

        Ok(AreaStatistics {
            routes_by_area,
            bins_by_location,
        })
    }

    /// Engagement statistics as of now
    pub async fn engagement_statistics(&self) -> AppResult<EngagementStatistics> {
        self.engagement_statistics_at(Utc::now()).await
    }

    /// Users per role, recently active users, pickup and ticket status counts
    #[instrument(skip(self))]
    pub async fn engagement_statistics_at(
        &self,
        now: DateTime<Utc>,
    ) -> AppResult<EngagementStatistics> {
        let recent = UserFilter::logged_in(ReportingPeriods::at(now).trailing);

        let (mut users_by_role, active_users, mut pickup_request_stats, mut ticket_stats) = tokio::try_join!(
            self.repos.users.count_by_role(),
            self.repos.users.count(&recent),
            self.repos.pickups.count_by_status(),
            self.repos.tickets.count_by_status(),
        )?;

        users_by_role.sort_by(|a, b| a.key.as_str().cmp(b.key.as_str()));
        pickup_request_stats.sort_by(|a, b| a.key.as_str().cmp(b.key.as_str()));
        ticket_stats.sort_by(|a, b| a.key.as_str().cmp(b.key.as_str()));

        Ok(EngagementStatistics {
            users_by_role,
            active_users,
            pickup_request_stats,
            ticket_stats,
        })
    }

    /// Rows of `kind` inside `window` with relations expanded
    #[instrument(skip(self))]
    pub async fn export(&self, kind: ExportKind, window: DateWindow) -> AppResult<ExportRecords> {
        let records = match kind {
            ExportKind::Collections => {
                ExportRecords::Collections(self.repos.collections.export(&window).await?)
            }
            ExportKind::Pickups => ExportRecords::Pickups(self.repos.pickups.export(&window).await?),
            ExportKind::Payments => {
                ExportRecords::Payments(self.repos.payments.export(&window).await?)
            }
        };

        debug!("Exported {} {} rows", records.len(), kind);
        Ok(records)
    }
}

impl std::fmt::Debug for AnalyticsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyticsService").finish_non_exhaustive()
    }
}
