//! Category repository. Categories partition the product catalog; deleting
//! one cascades to its products (schema-level `ON DELETE CASCADE`).

use electrostock_core::{validation, Category};
use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};

/// Repository for product categories.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Lists all categories ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, created_at FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Fetches one category by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Category> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, created_at FROM categories WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Category", id))?;

        Ok(category)
    }

    /// Creates a category and returns its id. Names are unique.
    pub async fn create(&self, name: &str) -> DbResult<i64> {
        validation::validate_name("name", name).map_err(electrostock_core::CoreError::from)?;

        let result = sqlx::query("INSERT INTO categories (name) VALUES (?)")
            .bind(name.trim())
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    /// Renames a category.
    pub async fn update(&self, id: i64, name: &str) -> DbResult<()> {
        validation::validate_name("name", name).map_err(electrostock_core::CoreError::from)?;

        let result = sqlx::query("UPDATE categories SET name = ? WHERE id = ?")
            .bind(name.trim())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        Ok(())
    }

    /// Deletes a category. Its products go with it.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use crate::error::DbError;

    #[tokio::test]
    async fn test_create_and_list_sorted() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.categories();

        repo.create("Cables").await.unwrap();
        repo.create("Audio").await.unwrap();

        let all = repo.list().await.unwrap();
        let names: Vec<_> = all.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Audio", "Cables"]);
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.categories();

        repo.create("Cables").await.unwrap();
        let err = repo.create("Cables").await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_delete_cascades_to_products() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let category_id = db.categories().create("Cables").await.unwrap();

        sqlx::query("INSERT INTO products (category_id, name, price) VALUES (?, 'USB-C', 1500.0)")
            .bind(category_id)
            .execute(db.pool())
            .await
            .unwrap();

        db.categories().delete(category_id).await.unwrap();

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db.categories().update(999, "Ghost").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
