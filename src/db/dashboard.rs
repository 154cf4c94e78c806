//! Dashboard listing, stats and analytics queries.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Months, TimeZone, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::products::{row_to_product, PRODUCT_COLUMNS};
use super::sellers::row_to_seller;
use super::{DbResult, Database};
use crate::models::{Product, Seller};

pub const MAX_PAGE_SIZE: u32 = 100;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const TOP_USERS: u32 = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    Today,
    Week,
    Month,
    #[default]
    All,
}

impl DateRange {
    /// Inclusive creation-time window in epoch millis, `None` for all time
    pub fn bounds(self, now: DateTime<Utc>) -> Option<(i64, i64)> {
        let start = match self {
            DateRange::All => return None,
            DateRange::Today => {
                let midnight = Utc
                    .from_utc_datetime(&now.date_naive().and_hms_opt(0, 0, 0)?)
                    .timestamp_millis();
                let end = midnight + Duration::days(1).num_milliseconds() - 1;
                return Some((midnight, end));
            }
            DateRange::Week => now - Duration::days(7),
            DateRange::Month => now.checked_sub_months(Months::new(1))?,
        };
        Some((start.timestamp_millis(), now.timestamp_millis()))
    }
}

impl FromStr for DateRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "today" => Ok(DateRange::Today),
            "week" => Ok(DateRange::Week),
            "month" => Ok(DateRange::Month),
            "all" => Ok(DateRange::All),
            other => Err(format!(
                "invalid dateRange '{}', expected today, week, month or all",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Date,
    Products,
    Name,
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(SortBy::Date),
            "products" => Ok(SortBy::Products),
            "name" => Ok(SortBy::Name),
            other => Err(format!(
                "invalid sortBy '{}', expected date, products or name",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    fn sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("invalid sortOrder '{}', expected asc or desc", other)),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        })
    }
}

/// A validated dashboard request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardQuery {
    pub date_range: DateRange,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    /// 1-based
    pub page: u32,
    pub limit: u32,
}

impl Default for DashboardQuery {
    fn default() -> Self {
        Self {
            date_range: DateRange::All,
            sort_by: SortBy::Date,
            sort_order: SortOrder::Desc,
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl DashboardQuery {
    fn order_clause(&self) -> String {
        let dir = self.sort_order.sql();
        match self.sort_by {
            SortBy::Date => format!("s.created_at {dir}, s.rowid {dir}"),
            SortBy::Products => format!("product_count {dir}, s.created_at DESC"),
            SortBy::Name => format!("s.name COLLATE NOCASE {dir}, s.created_at DESC"),
        }
    }

    fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.limit)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_sellers: u64,
    pub total_products: u64,
    pub average_products_per_seller: f64,
}

/// Owning user as shown on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SellerOwner {
    pub id: String,
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SellerSummary {
    #[serde(flatten)]
    pub seller: Seller,
    pub products: Vec<Product>,
    pub user: SellerOwner,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_items: u64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub limit: u32,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total_items: u64) -> Self {
        let limit = limit.max(1);
        let total_pages = u32::try_from(total_items.div_ceil(u64::from(limit))).unwrap_or(u32::MAX);
        Self {
            current_page: page,
            total_pages,
            total_items,
            has_next_page: page < total_pages,
            has_previous_page: page > 1,
            limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DashboardPage {
    pub stats: DashboardStats,
    pub sellers: Vec<SellerSummary>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DailyCount {
    /// Calendar day, `YYYY-MM-DD` (UTC)
    pub date: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopUser {
    pub id: String,
    pub name: String,
    pub seller_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub products_per_day: Vec<DailyCount>,
    pub top_users: Vec<TopUser>,
    pub average_products_per_seller: f64,
}

fn split_bounds(bounds: Option<(i64, i64)>) -> (Option<i64>, Option<i64>) {
    match bounds {
        Some((start, end)) => (Some(start), Some(end)),
        None => (None, None),
    }
}

fn count_in_range(conn: &Connection, table: &str, start: Option<i64>, end: Option<i64>) -> DbResult<u64> {
    let count: i64 = conn.query_row(
        &format!(
            "SELECT COUNT(*) FROM {table}
             WHERE (?1 IS NULL OR created_at >= ?1) AND (?2 IS NULL OR created_at <= ?2)"
        ),
        params![start, end],
        |row| row.get(0),
    )?;
    Ok(count.max(0) as u64)
}

/// One page of sellers with their products and owners, plus totals for the window
pub fn page(db: &Database, query: &DashboardQuery, now: DateTime<Utc>) -> DbResult<DashboardPage> {
    let (start, end) = split_bounds(query.date_range.bounds(now));

    db.with_conn(|conn| {
        let total_sellers = count_in_range(conn, "sellers", start, end)?;
        let total_products = count_in_range(conn, "products", start, end)?;

        let mut stmt = conn.prepare(&format!(
            "SELECT s.id, s.name, s.phone, s.gst_number, s.shop_image, s.user_id,
                    s.created_at, s.updated_at, u.name, u.phone,
                    (SELECT COUNT(*) FROM products p WHERE p.seller_id = s.id) AS product_count
             FROM sellers s JOIN users u ON u.id = s.user_id
             WHERE (?1 IS NULL OR s.created_at >= ?1) AND (?2 IS NULL OR s.created_at <= ?2)
             ORDER BY {}
             LIMIT ?3 OFFSET ?4",
            query.order_clause()
        ))?;
        let rows = stmt
            .query_map(
                params![start, end, i64::from(query.limit), query.offset()],
                |row| {
                    let seller = row_to_seller(row)?;
                    let user = SellerOwner {
                        id: seller.user_id.clone(),
                        name: row.get(8)?,
                        phone: row.get(9)?,
                    };
                    Ok((seller, user))
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;

        let mut products_stmt = conn.prepare(&format!(
            "SELECT {} FROM products WHERE seller_id = ?1 ORDER BY created_at DESC, rowid DESC",
            PRODUCT_COLUMNS
        ))?;
        let mut sellers = Vec::with_capacity(rows.len());
        for (seller, user) in rows {
            let products = products_stmt
                .query_map([&seller.id], row_to_product)?
                .collect::<Result<Vec<_>, _>>()?;
            sellers.push(SellerSummary {
                seller,
                products,
                user,
            });
        }

        let average_products_per_seller = if total_sellers > 0 {
            total_products as f64 / total_sellers as f64
        } else {
            0.0
        };

        Ok(DashboardPage {
            stats: DashboardStats {
                total_sellers,
                total_products,
                average_products_per_seller,
            },
            sellers,
            pagination: Pagination::new(query.page, query.limit, total_sellers),
        })
    })
}

pub fn analytics(db: &Database, range: DateRange, now: DateTime<Utc>) -> DbResult<Analytics> {
    let (start, end) = split_bounds(range.bounds(now));

    db.with_conn(|conn| {
        let mut per_day = conn.prepare(
            "SELECT date(created_at / 1000, 'unixepoch') AS day, COUNT(*)
             FROM products
             WHERE (?1 IS NULL OR created_at >= ?1) AND (?2 IS NULL OR created_at <= ?2)
             GROUP BY day ORDER BY day ASC",
        )?;
        let products_per_day = per_day
            .query_map(params![start, end], |row| {
                Ok(DailyCount {
                    date: row.get(0)?,
                    count: row.get::<_, i64>(1)?.max(0) as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut top = conn.prepare(
            "SELECT u.id, u.name, COUNT(s.id) AS seller_count
             FROM users u LEFT JOIN sellers s ON s.user_id = u.id
             GROUP BY u.id
             ORDER BY seller_count DESC, u.created_at ASC
             LIMIT ?1",
        )?;
        let top_users = top
            .query_map([TOP_USERS], |row| {
                Ok(TopUser {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    seller_count: row.get::<_, i64>(2)?.max(0) as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let average: Option<f64> = conn.query_row(
            "SELECT AVG(product_count) FROM (
                SELECT COUNT(p.id) AS product_count
                FROM sellers s LEFT JOIN products p ON p.seller_id = s.id
                WHERE (?1 IS NULL OR s.created_at >= ?1) AND (?2 IS NULL OR s.created_at <= ?2)
                GROUP BY s.id
             )",
            params![start, end],
            |row| row.get(0),
        )?;

        Ok(Analytics {
            products_per_day,
            top_users,
            average_products_per_seller: average.unwrap_or(0.0),
        })
    })
}
