//! Admin service
//!
//! Dashboard statistics, user management, activity and sales reporting.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::app::activity::record_activity;
use crate::app::parse_field;
use crate::domain::entities::{
    ActivityAction, ActivityLog, NewActivity, Order, OrderFilter, OrderStatus, Page, PageRequest,
    Role, TopProduct, User, UserFilter, UserId,
};
use crate::domain::ports::{ActivityRepository, OrderRepository, ProductRepository, UserRepository};
use crate::error::{AppError, DomainError};

pub const DEFAULT_USER_PAGE_SIZE: u64 = 20;
const RECENT_ORDERS: usize = 5;
const RECENT_ORDER_ITEMS: usize = 3;
const DASHBOARD_TOP_PRODUCTS: u64 = 5;

/// Reporting window selected with `?period=`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Week,
    Month,
    Quarter,
    Year,
}

impl Period {
    /// Unknown or missing values fall back to 30 days
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("7d") => Period::Week,
            Some("90d") => Period::Quarter,
            Some("1y") => Period::Year,
            _ => Period::Month,
        }
    }

    pub fn days(self) -> i64 {
        match self {
            Period::Week => 7,
            Period::Month => 30,
            Period::Quarter => 90,
            Period::Year => 365,
        }
    }

    pub fn start(self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(self.days())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRevenue {
    pub month: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_orders: u64,
    pub total_revenue: f64,
    pub total_products: u64,
    pub total_customers: u64,
    pub pending_orders: u64,
    pub low_stock_products: u64,
    pub recent_orders: Vec<Order>,
    pub top_products: Vec<TopProduct>,
    pub monthly_revenue: Vec<MonthlyRevenue>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub orders: Vec<Order>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub total_revenue: f64,
    pub total_orders: u64,
    pub average_order_value: f64,
    pub orders: Vec<Order>,
}

/// Admin user listing query
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

pub struct AdminService<UR, PR, OR, AR>
where
    UR: UserRepository,
    PR: ProductRepository,
    OR: OrderRepository,
    AR: ActivityRepository,
{
    users: Arc<UR>,
    products: Arc<PR>,
    orders: Arc<OR>,
    activity: Arc<AR>,
}

impl<UR, PR, OR, AR> AdminService<UR, PR, OR, AR>
where
    UR: UserRepository,
    PR: ProductRepository,
    OR: OrderRepository,
    AR: ActivityRepository,
{
    pub fn new(users: Arc<UR>, products: Arc<PR>, orders: Arc<OR>, activity: Arc<AR>) -> Self {
        Self {
            users,
            products,
            orders,
            activity,
        }
    }

    /// Order figures cover the period; product and customer counts are global
    pub async fn dashboard(&self, period: Option<&str>) -> Result<DashboardStats, AppError> {
        let period = Period::parse(period);
        let filter = OrderFilter {
            from: Some(period.start(Utc::now())),
            ..Default::default()
        };
        let orders = self.orders.list_all(&filter).await?;
        let product_stats = self.products.stats().await?;
        let total_customers = self.users.count_by_role(Role::User).await?;
        let top_products = self.products.top_selling(DASHBOARD_TOP_PRODUCTS).await?;

        let recent_orders = orders
            .iter()
            .take(RECENT_ORDERS)
            .cloned()
            .map(|mut o| {
                o.items.truncate(RECENT_ORDER_ITEMS);
                o
            })
            .collect();

        Ok(DashboardStats {
            total_orders: orders.len() as u64,
            total_revenue: revenue(&orders),
            total_products: product_stats.total_products,
            total_customers,
            pending_orders: orders
                .iter()
                .filter(|o| o.status == OrderStatus::Pending)
                .count() as u64,
            low_stock_products: product_stats.low_stock_products,
            recent_orders,
            top_products,
            monthly_revenue: monthly_revenue(&orders),
        })
    }

    pub async fn users(&self, query: &UserQuery) -> Result<Page<User>, AppError> {
        let role = match query.role.as_deref().filter(|r| !r.is_empty()) {
            Some(raw) => Some(parse_field::<Role>(raw)?),
            None => None,
        };
        let filter = UserFilter {
            search: query
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            role,
            is_active: query.is_active,
        };
        let page = PageRequest::new(query.page, query.limit, DEFAULT_USER_PAGE_SIZE);
        Ok(self.users.list(&filter, page).await?)
    }

    /// A user with their most recent orders
    pub async fn user(&self, id: &UserId) -> Result<UserDetail, AppError> {
        let user = self.find_user(id).await?;
        let filter = OrderFilter {
            user_id: Some(*id),
            ..Default::default()
        };
        let orders = self
            .orders
            .list(&filter, PageRequest { page: 1, limit: RECENT_ORDERS as u64 })
            .await?
            .items;

        Ok(UserDetail { user, orders })
    }

    /// `is_admin` follows the role unless given explicitly
    pub async fn update_role(
        &self,
        actor: &User,
        id: &UserId,
        role: &str,
        is_admin: Option<bool>,
    ) -> Result<User, AppError> {
        let role = parse_field::<Role>(role)?;
        self.find_user(id).await?;

        let user = self
            .users
            .update_role(id, role, is_admin.unwrap_or(role == Role::Admin))
            .await?;

        tracing::info!(user_id = %id, role = %role, "User role changed");
        record_activity(
            self.activity.as_ref(),
            NewActivity::new(
                ActivityAction::UserRoleChanged,
                format!("{} is now {}", user.email, role),
            )
            .by(actor.id)
            .on(id.0),
        )
        .await;

        Ok(user)
    }

    /// Soft delete
    pub async fn delete_user(&self, actor: &User, id: &UserId) -> Result<(), AppError> {
        if actor.id == *id {
            return Err(
                DomainError::Validation("You cannot delete your own account".to_string()).into(),
            );
        }
        let user = self.find_user(id).await?;
        self.users.set_active(id, false).await?;

        tracing::info!(user_id = %id, "User deactivated");
        record_activity(
            self.activity.as_ref(),
            NewActivity::new(
                ActivityAction::UserDeactivated,
                format!("{} deactivated", user.email),
            )
            .by(actor.id)
            .on(id.0),
        )
        .await;

        Ok(())
    }

    pub async fn toggle_status(&self, actor: &User, id: &UserId) -> Result<User, AppError> {
        let user = self.find_user(id).await?;
        let user = self.users.set_active(id, !user.is_active).await?;

        record_activity(
            self.activity.as_ref(),
            NewActivity::new(
                ActivityAction::UserStatusToggled,
                format!(
                    "{} {}",
                    user.email,
                    if user.is_active { "activated" } else { "deactivated" }
                ),
            )
            .by(actor.id)
            .on(id.0),
        )
        .await;

        Ok(user)
    }

    pub async fn recent_activity(&self, limit: Option<i64>) -> Result<Vec<ActivityLog>, AppError> {
        let limit = limit.unwrap_or(10).clamp(1, 100) as u64;
        Ok(self.activity.recent(limit).await?)
    }

    /// Explicit dates win over the period; both must be given to count
    pub async fn sales_report(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
        period: Option<&str>,
    ) -> Result<SalesReport, AppError> {
        let (from, to) = match (start_date, end_date) {
            (Some(start), Some(end)) => {
                let from = parse_date(start, false)?;
                let to = parse_date(end, true)?;
                if from > to {
                    return Err(AppError::BadRequest(
                        "startDate must not be after endDate".to_string(),
                    ));
                }
                (from, to)
            }
            _ => {
                let now = Utc::now();
                (Period::parse(period).start(now), now)
            }
        };

        let filter = OrderFilter {
            from: Some(from),
            to: Some(to),
            ..Default::default()
        };
        let orders: Vec<Order> = self
            .orders
            .list_all(&filter)
            .await?
            .into_iter()
            .filter(|o| o.status != OrderStatus::Cancelled)
            .collect();

        let total_revenue = revenue(&orders);
        let total_orders = orders.len() as u64;
        let average_order_value = if total_orders == 0 {
            0.0
        } else {
            round_cents(total_revenue / total_orders as f64)
        };

        Ok(SalesReport {
            total_revenue,
            total_orders,
            average_order_value,
            orders,
        })
    }

    pub async fn top_products(&self, limit: Option<i64>) -> Result<Vec<TopProduct>, AppError> {
        let limit = limit.unwrap_or(10).clamp(1, 100) as u64;
        Ok(self.products.top_selling(limit).await?)
    }

    async fn find_user(&self, id: &UserId) -> Result<User, AppError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Revenue of all orders that were not cancelled
fn revenue(orders: &[Order]) -> f64 {
    round_cents(
        orders
            .iter()
            .filter(|o| o.status != OrderStatus::Cancelled)
            .map(|o| o.total)
            .sum(),
    )
}

/// Revenue grouped by calendar month, oldest first, labelled "Jan 2024"
fn monthly_revenue(orders: &[Order]) -> Vec<MonthlyRevenue> {
    let mut months: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for order in orders.iter().filter(|o| o.status != OrderStatus::Cancelled) {
        let key = (order.created_at.year(), order.created_at.month());
        *months.entry(key).or_default() += order.total;
    }

    months
        .into_iter()
        .filter_map(|((year, month), total)| {
            let label = NaiveDate::from_ymd_opt(year, month, 1)?
                .format("%b %Y")
                .to_string();
            Some(MonthlyRevenue {
                month: label,
                revenue: round_cents(total),
            })
        })
        .collect()
}

/// `YYYY-MM-DD` (start or end of that day) or a full RFC 3339 timestamp
fn parse_date(raw: &str, end_of_day: bool) -> Result<DateTime<Utc>, AppError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("Invalid date: {}", raw)))?;
    let time = if end_of_day {
        NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
    } else {
        NaiveTime::from_hms_opt(0, 0, 0)
    }
    .ok_or_else(|| AppError::Internal("Invalid time of day".to_string()))?;
    Ok(Utc.from_utc_datetime(&date.and_time(time)))
}
