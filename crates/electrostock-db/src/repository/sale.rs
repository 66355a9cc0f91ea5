//! # Sale Repository
//!
//! The heart of the transaction engine: committing a sale atomically across
//! three tables, and reading sale history back.
//!
//! ## Sale Transaction
//! ```text
//! create_sale(header, items)
//!   │  validate (non-empty, quantities > 0, total re-derived)
//!   ▼
//! BEGIN
//!   ├── INSERT sales                      → sale_id
//!   ├── for each item:
//!   │     ├── INSERT sale_items           (name/category snapshots)
//!   │     └── UPDATE products
//!   │           SET stock = stock - qty
//!   │           WHERE id = ? AND stock >= qty
//!   │                    │
//!   │                    └── 0 rows → InsufficientStock → ROLLBACK
//!   └── INSERT cash_register              (income, total, sale_id link)
//! COMMIT
//! ```
//! The guarded decrement makes overselling impossible even when two
//! terminals race on the last unit: the losing transaction rolls back whole.

use electrostock_core::{validation, CoreError, NewSale, NewSaleItem, Sale, SaleItem, SaleSummary};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::info;

use crate::error::{DbError, DbResult};

/// Optional, conjunctive filters for the sale list.
///
/// Date bounds compare against the stored `sale_date` text
/// (`YYYY-MM-DD HH:MM:SS`), so a bare `"2026-08-25"` start behaves as
/// midnight that day.
#[derive(Debug, Clone, Default)]
pub struct SaleFilters {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub payment_method: Option<String>,
}

/// Repository for sales.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Commits a sale: header, item snapshots, guarded stock decrements and
    /// the cash register income, all or nothing. Returns the sale id.
    pub async fn create_sale(&self, sale: &NewSale, items: &[NewSaleItem]) -> DbResult<i64> {
        validation::validate_sale(sale, items)?;

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO sales
                 (payment_method, currency, subtotal, surcharge, total, installments,
                  customer_notes, warranty_enabled, warranty_months, client_id)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&sale.payment_method)
        .bind(sale.currency)
        .bind(sale.subtotal)
        .bind(sale.surcharge)
        .bind(sale.total)
        .bind(sale.installments)
        .bind(&sale.customer_notes)
        .bind(sale.warranty_enabled)
        .bind(sale.warranty_months)
        .bind(sale.client_id)
        .execute(&mut *tx)
        .await?;

        let sale_id = result.last_insert_rowid();

        for item in items {
            sqlx::query(
                "INSERT INTO sale_items
                     (sale_id, product_id, product_name, category_name, quantity,
                      unit_price, subtotal)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(sale_id)
            .bind(item.product_id)
            .bind(&item.product_name)
            .bind(&item.category_name)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.subtotal)
            .execute(&mut *tx)
            .await?;

            let decremented = sqlx::query(
                "UPDATE products SET stock = stock - ? WHERE id = ? AND stock >= ?",
            )
            .bind(item.quantity)
            .bind(item.product_id)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;

            if decremented.rows_affected() == 0 {
                let available: i64 =
                    sqlx::query_scalar("SELECT stock FROM products WHERE id = ?")
                        .bind(item.product_id)
                        .fetch_optional(&mut *tx)
                        .await?
                        .ok_or_else(|| DbError::not_found("Product", item.product_id))?;

                return Err(CoreError::InsufficientStock {
                    product_id: item.product_id,
                    available,
                    requested: item.quantity,
                }
                .into());
            }
        }

        let description = match sale.client_id {
            Some(_) => format!(
                "Venta #{sale_id} - {} (Cliente Registrado)",
                sale.payment_method
            ),
            None => format!("Venta #{sale_id} - {}", sale.payment_method),
        };

        sqlx::query(
            "INSERT INTO cash_register
                 (type, amount, currency, payment_method, description, sale_id)
             VALUES ('income', ?, ?, ?, ?, ?)",
        )
        .bind(sale.total)
        .bind(sale.currency)
        .bind(&sale.payment_method)
        .bind(description)
        .bind(sale_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!(sale_id, total = sale.total, "Sale committed");

        Ok(sale_id)
    }

    /// Lists sales newest first with their item names concatenated, under
    /// the given filters.
    pub async fn list(&self, filters: &SaleFilters) -> DbResult<Vec<SaleSummary>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT s.id, s.sale_date, s.payment_method, s.currency, s.subtotal,
                    s.surcharge, s.total, s.installments, s.customer_notes,
                    s.warranty_enabled, s.warranty_months, s.client_id, s.created_at,
                    GROUP_CONCAT(DISTINCT si.category_name) AS category_names,
                    GROUP_CONCAT(si.product_name, ', ') AS product_names
             FROM sales s
             LEFT JOIN sale_items si ON s.id = si.sale_id
             WHERE 1=1",
        );

        if let Some(start) = &filters.start_date {
            builder.push(" AND s.sale_date >= ").push_bind(start);
        }
        if let Some(end) = &filters.end_date {
            builder.push(" AND s.sale_date <= ").push_bind(end);
        }
        if let Some(method) = &filters.payment_method {
            builder.push(" AND s.payment_method = ").push_bind(method);
        }

        builder.push(" GROUP BY s.id ORDER BY s.sale_date DESC, s.id DESC");

        let sales = builder
            .build_query_as::<SaleSummary>()
            .fetch_all(&self.pool)
            .await?;

        Ok(sales)
    }

    /// Fetches one sale header.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Sale> {
        let sale = sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", id))?;

        Ok(sale)
    }

    /// Lists the line items of one sale.
    pub async fn items(&self, sale_id: i64) -> DbResult<Vec<SaleItem>> {
        let items =
            sqlx::query_as::<_, SaleItem>("SELECT * FROM sale_items WHERE sale_id = ?")
                .bind(sale_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(items)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
