//! # Product Repository
//!
//! Catalog CRUD plus the inventory-ledger primitives the POS depends on:
//! barcode lookup with a numeric-id fallback, bounded search, and guarded
//! stock adjustment.
//!
//! ## Barcode Lookup
//! ```text
//! scan "7791234567890"                     scan "42"
//!       │                                        │
//!       ▼                                        ▼
//! barcode = '7791234567890' → hit         barcode = '42' → miss
//!                                                │ (all digits)
//!                                                ▼
//!                                          id = 42 → hit
//! ```
//! Older stock was labeled with the raw row id before the barcode column
//! existed; the fallback keeps those labels scannable.

use electrostock_core::{
    validation, CoreError, NewProduct, Product, ProductUpdate, ProductWithCategory,
    PRODUCT_SEARCH_LIMIT,
};
use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};

const PRODUCT_WITH_CATEGORY_COLUMNS: &str = "p.id, p.category_id, p.name, p.supplier, \
     p.cost_usd, p.cost_ars, p.price, p.stock, p.description, p.barcode, p.created_at, \
     c.name AS category_name";

/// Repository for products and stock.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Lists the whole catalog with category names, ordered by product name.
    pub async fn list(&self) -> DbResult<Vec<ProductWithCategory>> {
        let sql = format!(
            "SELECT {PRODUCT_WITH_CATEGORY_COLUMNS}
             FROM products p
             LEFT JOIN categories c ON p.category_id = c.id
             ORDER BY p.name"
        );
        let products = sqlx::query_as::<_, ProductWithCategory>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Lists the products of one category, ordered by name.
    pub async fn list_by_category(&self, category_id: i64) -> DbResult<Vec<ProductWithCategory>> {
        let sql = format!(
            "SELECT {PRODUCT_WITH_CATEGORY_COLUMNS}
             FROM products p
             LEFT JOIN categories c ON p.category_id = c.id
             WHERE p.category_id = ?
             ORDER BY p.name"
        );
        let products = sqlx::query_as::<_, ProductWithCategory>(&sql)
            .bind(category_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Fetches one product by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Product> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        Ok(product)
    }

    /// Looks a product up by scanned code.
    ///
    /// Exact `barcode` match first; when that misses and the code is all
    /// digits, falls back to the row id. Returns `None` when both miss —
    /// an unknown code is a normal scan outcome, not an error.
    pub async fn get_by_barcode(&self, code: &str) -> DbResult<Option<ProductWithCategory>> {
        let code = code.trim();
        if code.is_empty() {
            return Ok(None);
        }

        let sql = format!(
            "SELECT {PRODUCT_WITH_CATEGORY_COLUMNS}
             FROM products p
             LEFT JOIN categories c ON p.category_id = c.id
             WHERE p.barcode = ?"
        );
        if let Some(product) = sqlx::query_as::<_, ProductWithCategory>(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?
        {
            return Ok(Some(product));
        }

        let Ok(numeric_id) = code.parse::<i64>() else {
            return Ok(None);
        };

        let sql = format!(
            "SELECT {PRODUCT_WITH_CATEGORY_COLUMNS}
             FROM products p
             LEFT JOIN categories c ON p.category_id = c.id
             WHERE p.id = ?"
        );
        let product = sqlx::query_as::<_, ProductWithCategory>(&sql)
            .bind(numeric_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Searches products by name, description or barcode.
    ///
    /// Case-insensitive substring match, capped at [`PRODUCT_SEARCH_LIMIT`]
    /// rows. An empty query returns nothing rather than the whole catalog.
    pub async fn search(&self, query: &str) -> DbResult<Vec<ProductWithCategory>> {
        let query = validation::validate_search_query(query).map_err(CoreError::from)?;
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let pattern = format!("%{query}%");
        let sql = format!(
            "SELECT {PRODUCT_WITH_CATEGORY_COLUMNS}
             FROM products p
             LEFT JOIN categories c ON p.category_id = c.id
             WHERE p.name LIKE ? OR p.description LIKE ? OR p.barcode LIKE ?
             ORDER BY p.name
             LIMIT ?"
        );
        let products = sqlx::query_as::<_, ProductWithCategory>(&sql)
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .bind(PRODUCT_SEARCH_LIMIT)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Creates a product and returns its id.
    pub async fn create(&self, product: &NewProduct) -> DbResult<i64> {
        validation::validate_name("name", &product.name).map_err(CoreError::from)?;
        validation::validate_non_negative_amount("price", product.price)
            .map_err(CoreError::from)?;

        let result = sqlx::query(
            "INSERT INTO products
                 (category_id, name, supplier, cost_usd, cost_ars, price, stock, description)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(product.category_id)
        .bind(product.name.trim())
        .bind(&product.supplier)
        .bind(product.cost_usd)
        .bind(product.cost_ars)
        .bind(product.price)
        .bind(product.stock)
        .bind(&product.description)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Updates a product's editable fields. The category and barcode are not
    /// touched here; barcodes go through [`update_barcode`](Self::update_barcode).
    pub async fn update(&self, id: i64, update: &ProductUpdate) -> DbResult<()> {
        validation::validate_name("name", &update.name).map_err(CoreError::from)?;
        validation::validate_non_negative_amount("price", update.price)
            .map_err(CoreError::from)?;

        let result = sqlx::query(
            "UPDATE products
             SET name = ?, supplier = ?, cost_usd = ?, cost_ars = ?,
                 price = ?, stock = ?, description = ?
             WHERE id = ?",
        )
        .bind(update.name.trim())
        .bind(&update.supplier)
        .bind(update.cost_usd)
        .bind(update.cost_ars)
        .bind(update.price)
        .bind(update.stock)
        .bind(&update.description)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Sets or clears a product's barcode. Barcodes are unique.
    pub async fn update_barcode(&self, id: i64, barcode: Option<&str>) -> DbResult<()> {
        let barcode = barcode.map(str::trim).filter(|b| !b.is_empty());

        let result = sqlx::query("UPDATE products SET barcode = ? WHERE id = ?")
            .bind(barcode)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Adjusts a product's stock by a signed delta, guarded against going
    /// negative. Sales never call this; their decrement runs inside the sale
    /// transaction. This is for manual corrections and received merchandise.
    pub async fn adjust_stock(&self, id: i64, delta: i64) -> DbResult<i64> {
        let result = sqlx::query(
            "UPDATE products SET stock = stock + ? WHERE id = ? AND stock + ? >= 0",
        )
        .bind(delta)
        .bind(id)
        .bind(delta)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Either the product is missing or the delta would go negative.
            let product = self.get_by_id(id).await?;
            return Err(CoreError::InsufficientStock {
                product_id: id,
                available: product.stock,
                requested: -delta,
            }
            .into());
        }

        let stock: i64 = sqlx::query_scalar("SELECT stock FROM products WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(stock)
    }

    /// Deletes a product. Fails with a foreign key violation when sale
    /// history references it.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
