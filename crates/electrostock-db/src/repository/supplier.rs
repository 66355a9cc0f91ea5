//! Supplier repository. Plain CRUD plus bounded search; the money side of
//! the supplier relationship lives in the purchase repository.

use electrostock_core::{
    validation, CoreError, Supplier, SupplierInput, SUPPLIER_SEARCH_LIMIT,
};
use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};

/// Repository for suppliers.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Lists all suppliers ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Supplier>> {
        let suppliers =
            sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

        Ok(suppliers)
    }

    /// Fetches one supplier by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Supplier> {
        let supplier = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Supplier", id))?;

        Ok(supplier)
    }

    /// Searches suppliers by name, company or phone, capped at
    /// [`SUPPLIER_SEARCH_LIMIT`] rows.
    pub async fn search(&self, query: &str) -> DbResult<Vec<Supplier>> {
        let query = validation::validate_search_query(query).map_err(CoreError::from)?;
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let pattern = format!("%{query}%");
        let suppliers = sqlx::query_as::<_, Supplier>(
            "SELECT * FROM suppliers
             WHERE name LIKE ? OR company LIKE ? OR contact_phone LIKE ?
             ORDER BY name
             LIMIT ?",
        )
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .bind(SUPPLIER_SEARCH_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(suppliers)
    }

    /// Creates a supplier and returns its id.
    pub async fn create(&self, supplier: &SupplierInput) -> DbResult<i64> {
        validation::validate_name("name", &supplier.name).map_err(CoreError::from)?;

        let result = sqlx::query(
            "INSERT INTO suppliers
                 (name, company, products_sold, contact_phone, shipping_methods, notes)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(supplier.name.trim())
        .bind(&supplier.company)
        .bind(&supplier.products_sold)
        .bind(&supplier.contact_phone)
        .bind(&supplier.shipping_methods)
        .bind(&supplier.notes)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Updates a supplier's fields.
    pub async fn update(&self, id: i64, supplier: &SupplierInput) -> DbResult<()> {
        validation::validate_name("name", &supplier.name).map_err(CoreError::from)?;

        let result = sqlx::query(
            "UPDATE suppliers
             SET name = ?, company = ?, products_sold = ?, contact_phone = ?,
                 shipping_methods = ?, notes = ?
             WHERE id = ?",
        )
        .bind(supplier.name.trim())
        .bind(&supplier.company)
        .bind(&supplier.products_sold)
        .bind(&supplier.contact_phone)
        .bind(&supplier.shipping_methods)
        .bind(&supplier.notes)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }

        Ok(())
    }

    /// Deletes a supplier. Fails with a foreign key violation when purchase
    /// history references it.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn input(name: &str) -> SupplierInput {
        SupplierInput {
            name: name.to_string(),
            company: Some("TecnoParts SA".to_string()),
            products_sold: Some("cables, fuentes".to_string()),
            contact_phone: Some("11-5555-0000".to_string()),
            shipping_methods: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_crud_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.suppliers();

        let id = repo.create(&input("Carlos")).await.unwrap();
        let supplier = repo.get_by_id(id).await.unwrap();
        assert_eq!(supplier.company.as_deref(), Some("TecnoParts SA"));

        repo.update(id, &input("Carlos Gómez")).await.unwrap();
        assert_eq!(repo.get_by_id(id).await.unwrap().name, "Carlos Gómez");

        repo.delete(id).await.unwrap();
        assert!(matches!(
            repo.get_by_id(id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_search_matches_company_and_phone() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.suppliers();
        repo.create(&input("Carlos")).await.unwrap();

        assert_eq!(repo.search("TecnoParts").await.unwrap().len(), 1);
        assert_eq!(repo.search("5555").await.unwrap().len(), 1);
        assert!(repo.search("zzz").await.unwrap().is_empty());
        assert!(repo.search("  ").await.unwrap().is_empty());
    }
}
