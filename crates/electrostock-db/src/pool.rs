//! # Database Connection Pool
//!
//! Connection pool creation, configuration, and startup sequencing.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Database::new(config)                          │
//! │                                                                     │
//! │  1. Open SqlitePool                                                 │
//! │     ├── journal_mode = WAL       (concurrent reads during writes)   │
//! │     ├── synchronous  = NORMAL    (safe with WAL, much faster)       │
//! │     ├── foreign_keys = ON        (SQLite defaults them OFF)         │
//! │     └── create_if_missing                                           │
//! │  2. ensure_schema()              (tables + guarded migrations)      │
//! │  3. seed payment/store config    (INSERT OR IGNORE, first run only) │
//! │  4. ensure default admin         (only when users table is empty)   │
//! │                                                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::repository::{
    cash::CashRegisterRepository, category::CategoryRepository, client::ClientRepository,
    config::ConfigRepository, note::NoteRepository, product::ProductRepository,
    purchase::PurchaseRepository, report::ReportRepository, sale::SaleRepository,
    supplier::SupplierRepository, user::UserRepository,
};
use crate::schema;

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Database URL, e.g. `sqlite:/home/user/.local/share/electrostock.db`.
    pub url: String,
    /// Maximum pool size. Writes serialize on SQLite anyway; a handful of
    /// connections lets reads overlap under WAL.
    pub max_connections: u32,
    /// Create the database file when it does not exist.
    pub create_if_missing: bool,
    /// Run schema setup and seeding on open. Tests that build their own
    /// schema turn this off.
    pub run_schema: bool,
}

impl DbConfig {
    /// Config for an on-disk database at `path`.
    pub fn new(path: impl AsRef<str>) -> Self {
        Self {
            url: format!("sqlite:{}", path.as_ref()),
            max_connections: 5,
            create_if_missing: true,
            run_schema: true,
        }
    }

    /// Config for a private in-memory database.
    ///
    /// `max_connections` is pinned to 1: each in-memory connection gets its
    /// own database, so a larger pool would scatter tables across them.
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            create_if_missing: true,
            run_schema: true,
        }
    }

    /// Toggles schema setup and seeding on open.
    pub fn run_schema(mut self, run: bool) -> Self {
        self.run_schema = run;
        self
    }
}

// =============================================================================
// Database Handle
// =============================================================================

/// Handle to the application database.
///
/// Cheap to clone; all clones share the same pool. Repositories are created
/// on demand and borrow nothing, so call sites read as
/// `db.sales().create_sale(...)`.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the database and brings it to a ready state.
    ///
    /// Ready means: schema current, payment and store configuration seeded,
    /// and at least one login possible (a default admin is created when the
    /// users table is empty).
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .create_if_missing(config.create_if_missing)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        let db = Self { pool };

        if config.run_schema {
            schema::ensure_schema(&db.pool).await?;
            db.config().seed_defaults().await?;
            db.users().ensure_default_admin().await?;
            info!(url = %config.url, "Database ready");
        }

        Ok(db)
    }

    /// Raw pool access, for schema tooling and tests.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Verifies the connection is alive.
    pub async fn health_check(&self) -> DbResult<()> {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }

    /// Closes the pool, waiting for in-flight queries.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    // =========================================================================
    // Repository Accessors
    // =========================================================================

    pub fn categories(&self) -> CategoryRepository {
        CategoryRepository::new(self.pool.clone())
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone())
    }

    pub fn cash_register(&self) -> CashRegisterRepository {
        CashRegisterRepository::new(self.pool.clone())
    }

    pub fn clients(&self) -> ClientRepository {
        ClientRepository::new(self.pool.clone())
    }

    pub fn suppliers(&self) -> SupplierRepository {
        SupplierRepository::new(self.pool.clone())
    }

    pub fn purchases(&self) -> PurchaseRepository {
        PurchaseRepository::new(self.pool.clone())
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    pub fn config(&self) -> ConfigRepository {
        ConfigRepository::new(self.pool.clone())
    }

    pub fn reports(&self) -> ReportRepository {
        ReportRepository::new(self.pool.clone())
    }

    pub fn notes(&self) -> NoteRepository {
        NoteRepository::new(self.pool.clone())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_in_memory() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.health_check().await.unwrap();
    }

    #[tokio::test]
    async fn test_startup_seeds_payment_config() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payment_config")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 11);
    }

    #[tokio::test]
    async fn test_startup_creates_default_admin() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = 'admin'")
                .fetch_one(db.pool())
                .await
                .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_foreign_keys_enforced() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        // products.category_id references a category that does not exist
        let result = sqlx::query(
            "INSERT INTO products (category_id, name, price) VALUES (999, 'Ghost', 10.0)",
        )
        .execute(db.pool())
        .await;

        assert!(matches!(
            DbError::from(result.unwrap_err()),
            DbError::ForeignKeyViolation { .. }
        ));
    }
}
