//! # Report Repository
//!
//! Read-only aggregations: the dashboard payload and the monthly report.
//!
//! All time boundaries are computed in UTC because every stored timestamp
//! comes from SQLite's `CURRENT_TIMESTAMP`, which is UTC. Mixing local-time
//! boundaries with UTC rows would shift sales across day edges.
//!
//! ## Dashboard Payload
//! ```text
//! getDashboardStats
//!   ├── sales summary      today / this week (from Sunday) / this month
//!   ├── low stock          stock <= 5, worst 10 first
//!   ├── top products       all-time best 5 sellers by quantity
//!   └── last 7 days        income/expense per day, zero-filled
//! ```

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Utc};
use electrostock_core::{
    validation, CategorySalesRow, CoreError, Currency, DailyFlow, DashboardStats, FinancialRow,
    MonthlyReport, PeriodSummary, ProductWithCategory, SalesSummary, TopProductRow, TopSeller,
    LOW_STOCK_THRESHOLD,
};
use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};

const LOW_STOCK_LIMIT: i64 = 10;
const TOP_SELLERS_LIMIT: i64 = 5;
const MONTHLY_TOP_PRODUCTS_LIMIT: i64 = 10;

/// Repository for dashboard and report aggregations.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Builds the whole dashboard payload in one call.
    pub async fn dashboard_stats(&self) -> DbResult<DashboardStats> {
        self.dashboard_stats_at(Utc::now().naive_utc()).await
    }

    /// Dashboard payload relative to an explicit "now"; tests pin it.
    pub async fn dashboard_stats_at(&self, now: NaiveDateTime) -> DbResult<DashboardStats> {
        let today = now.date();
        let start_of_day = today.and_hms_opt(0, 0, 0).ok_or_else(invalid_date)?;
        // week starts on Sunday
        let start_of_week = (today
            - Duration::days(today.weekday().num_days_from_sunday() as i64))
        .and_hms_opt(0, 0, 0)
        .ok_or_else(invalid_date)?;
        let start_of_month = today
            .with_day(1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .ok_or_else(invalid_date)?;

        let sales_summary = SalesSummary {
            today: self.period_summary(start_of_day).await?,
            week: self.period_summary(start_of_week).await?,
            month: self.period_summary(start_of_month).await?,
        };

        let low_stock = sqlx::query_as::<_, ProductWithCategory>(
            "SELECT p.id, p.category_id, p.name, p.supplier, p.cost_usd, p.cost_ars,
                    p.price, p.stock, p.description, p.barcode, p.created_at,
                    c.name AS category_name
             FROM products p
             LEFT JOIN categories c ON p.category_id = c.id
             WHERE p.stock <= ?
             ORDER BY p.stock ASC
             LIMIT ?",
        )
        .bind(LOW_STOCK_THRESHOLD)
        .bind(LOW_STOCK_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        let top_products = sqlx::query_as::<_, TopSeller>(
            "SELECT product_name, SUM(quantity) AS total_sold
             FROM sale_items
             GROUP BY product_name
             ORDER BY total_sold DESC
             LIMIT ?",
        )
        .bind(TOP_SELLERS_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        // one point per calendar day, zero-filled when nothing happened
        let mut last7_days = Vec::with_capacity(7);
        for offset in (0..7).rev() {
            let date = today - Duration::days(offset);
            let date_str = date.format("%Y-%m-%d").to_string();

            let (income, expense): (f64, f64) = sqlx::query_as(
                "SELECT
                     COALESCE(SUM(CASE WHEN type = 'income' THEN amount ELSE 0.0 END), 0.0),
                     COALESCE(SUM(CASE WHEN type = 'expense' THEN amount ELSE 0.0 END), 0.0)
                 FROM cash_register
                 WHERE date(entry_date) = ?",
            )
            .bind(&date_str)
            .fetch_one(&self.pool)
            .await?;

            last7_days.push(DailyFlow {
                date: date_str,
                income,
                expense,
            });
        }

        Ok(DashboardStats {
            sales_summary,
            low_stock,
            top_products,
            last7_days,
        })
    }

    /// Builds the report for one calendar month (`month` is 1-12). The
    /// period runs from the 1st at 00:00:00 through the last day at
    /// 23:59:59, inclusive.
    pub async fn monthly_report(&self, year: i32, month: u32) -> DbResult<MonthlyReport> {
        validation::validate_month(month).map_err(CoreError::from)?;

        let start = NaiveDate::from_ymd_opt(year, month, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .ok_or_else(invalid_date)?;
        let first_of_next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        };
        let end = first_of_next
            .map(|d| d - Duration::days(1))
            .and_then(|d| d.and_hms_opt(23, 59, 59))
            .ok_or_else(invalid_date)?;

        // Revenue per currency comes from the headers alone; joining items
        // first would count a multi-item sale's total once per item.
        let revenue_rows: Vec<(Currency, f64)> = sqlx::query_as(
            "SELECT currency, COALESCE(SUM(total), 0.0)
             FROM sales
             WHERE sale_date >= ? AND sale_date <= ?
             GROUP BY currency",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        // Estimated cost uses the products' current cost fields, in the
        // sale's currency. A deliberate "what would this cost today"
        // estimate, not a historical snapshot.
        let cost_rows: Vec<(Currency, f64)> = sqlx::query_as(
            "SELECT s.currency,
                    COALESCE(SUM(CASE
                        WHEN s.currency = 'USD' THEN si.quantity * IFNULL(p.cost_usd, 0.0)
                        ELSE si.quantity * IFNULL(p.cost_ars, 0.0)
                    END), 0.0)
             FROM sales s
             JOIN sale_items si ON s.id = si.sale_id
             JOIN products p ON si.product_id = p.id
             WHERE s.sale_date >= ? AND s.sale_date <= ?
             GROUP BY s.currency",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        let financial = revenue_rows
            .into_iter()
            .map(|(currency, revenue)| FinancialRow {
                currency,
                revenue,
                total_cost: cost_rows
                    .iter()
                    .find(|(c, _)| *c == currency)
                    .map(|(_, cost)| *cost)
                    .unwrap_or(0.0),
            })
            .collect();

        let by_category = sqlx::query_as::<_, CategorySalesRow>(
            "SELECT c.name AS category_name,
                    COUNT(DISTINCT s.id) AS sales_count,
                    SUM(si.quantity) AS items_sold,
                    SUM(si.subtotal) AS revenue
             FROM sales s
             JOIN sale_items si ON s.id = si.sale_id
             JOIN products p ON si.product_id = p.id
             LEFT JOIN categories c ON p.category_id = c.id
             WHERE s.sale_date >= ? AND s.sale_date <= ?
             GROUP BY c.id
             ORDER BY revenue DESC",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        let top_products = sqlx::query_as::<_, TopProductRow>(
            "SELECT si.product_name,
                    SUM(si.quantity) AS quantity,
                    SUM(si.subtotal) AS revenue
             FROM sale_items si
             JOIN sales s ON si.sale_id = s.id
             WHERE s.sale_date >= ? AND s.sale_date <= ?
             GROUP BY si.product_id
             ORDER BY quantity DESC
             LIMIT ?",
        )
        .bind(start)
        .bind(end)
        .bind(MONTHLY_TOP_PRODUCTS_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(MonthlyReport {
            financial,
            by_category,
            top_products,
        })
    }

    async fn period_summary(&self, since: NaiveDateTime) -> DbResult<PeriodSummary> {
        let (count, total): (i64, f64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(total), 0.0) FROM sales WHERE sale_date >= ?",
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(PeriodSummary { count, total })
    }
}

fn invalid_date() -> DbError {
    DbError::Internal("invalid date arithmetic".to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================
