//! # Schema Manager
//!
//! Idempotent schema creation and additive migrations.
//!
//! ## How Startup Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Schema Manager                                │
//! │                                                                     │
//! │  App Startup                                                        │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  CREATE TABLE IF NOT EXISTS ... (all base tables)    ← fatal        │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  PRAGMA user_version >= SCHEMA_VERSION?                             │
//! │       │                                                             │
//! │       ├── yes → skip introspection, done                            │
//! │       │                                                             │
//! │       ▼ no                                                          │
//! │  For each additive migration:                                       │
//! │       ├── column already there? (PRAGMA table_info) → skip          │
//! │       ├── ALTER TABLE ... ADD COLUMN ...                            │
//! │       └── failure? → warn + continue                 ← NOT fatal    │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  All steps ok → PRAGMA user_version = SCHEMA_VERSION                │
//! │                                                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why migration failures are swallowed
//! A corrupt or partially-migrated installation must never prevent the store
//! from opening and selling. A missing optional column only disables the
//! feature that needs it. This availability-over-strictness choice applies to
//! schema evolution ONLY — transactional writes are strict.

use sqlx::{Row, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};

/// Schema version reached when every additive migration has applied.
///
/// Bump this when appending to [`MIGRATIONS`]. Once the stored
/// `PRAGMA user_version` reaches it, startup skips the per-column
/// introspection entirely.
const SCHEMA_VERSION: i64 = 4;

/// Base table definitions. `IF NOT EXISTS` makes this safe on every startup.
///
/// New installations get the final column set directly; the additive
/// migrations below only matter for databases created by older builds.
const BASE_TABLES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS categories (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        category_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        supplier TEXT,
        cost_usd REAL DEFAULT 0,
        cost_ars REAL DEFAULT 0,
        price REAL NOT NULL,
        stock INTEGER DEFAULT 0,
        description TEXT,
        barcode TEXT UNIQUE,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (category_id) REFERENCES categories(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS payment_config (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        method TEXT UNIQUE NOT NULL,
        surcharge REAL DEFAULT 0,
        display_name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS clients (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        type TEXT DEFAULT 'consumer',
        identifier TEXT,
        phone TEXT,
        email TEXT,
        address TEXT,
        notes TEXT,
        debt REAL DEFAULT 0,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS client_movements (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        client_id INTEGER NOT NULL,
        movement_type TEXT NOT NULL,
        amount REAL NOT NULL,
        description TEXT,
        balance_after REAL NOT NULL,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (client_id) REFERENCES clients(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sales (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        sale_date DATETIME DEFAULT CURRENT_TIMESTAMP,
        payment_method TEXT NOT NULL,
        currency TEXT NOT NULL,
        subtotal REAL NOT NULL,
        surcharge REAL DEFAULT 0,
        total REAL NOT NULL,
        installments INTEGER DEFAULT 1,
        customer_notes TEXT,
        warranty_enabled INTEGER DEFAULT 0,
        warranty_months REAL DEFAULT 0,
        client_id INTEGER REFERENCES clients(id),
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sale_items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        sale_id INTEGER NOT NULL,
        product_id INTEGER NOT NULL,
        product_name TEXT NOT NULL,
        category_name TEXT,
        quantity INTEGER NOT NULL,
        unit_price REAL NOT NULL,
        subtotal REAL NOT NULL,
        FOREIGN KEY (sale_id) REFERENCES sales(id) ON DELETE CASCADE,
        FOREIGN KEY (product_id) REFERENCES products(id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS cash_register (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        entry_date DATETIME DEFAULT CURRENT_TIMESTAMP,
        type TEXT NOT NULL,
        amount REAL NOT NULL,
        currency TEXT NOT NULL,
        payment_method TEXT,
        description TEXT,
        expense_category TEXT,
        sale_id INTEGER,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (sale_id) REFERENCES sales(id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS store_config (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        key TEXT UNIQUE NOT NULL,
        value TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT UNIQUE NOT NULL,
        password_hash TEXT NOT NULL,
        salt TEXT NOT NULL,
        role TEXT NOT NULL DEFAULT 'seller',
        name TEXT,
        active INTEGER DEFAULT 1,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS suppliers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        company TEXT,
        products_sold TEXT,
        contact_phone TEXT,
        shipping_methods TEXT,
        notes TEXT,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS purchases (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        supplier_id INTEGER NOT NULL,
        description TEXT NOT NULL,
        total_amount REAL NOT NULL,
        paid_amount REAL DEFAULT 0,
        payment_status TEXT DEFAULT 'pending',
        purchase_date DATETIME DEFAULT CURRENT_TIMESTAMP,
        due_date TEXT,
        notes TEXT,
        FOREIGN KEY (supplier_id) REFERENCES suppliers(id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS purchase_payments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        purchase_id INTEGER NOT NULL,
        amount REAL NOT NULL,
        payment_date DATETIME DEFAULT CURRENT_TIMESTAMP,
        payment_method TEXT,
        notes TEXT,
        FOREIGN KEY (purchase_id) REFERENCES purchases(id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS notes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT,
        content TEXT,
        color TEXT DEFAULT 'bg-yellow-200',
        is_completed INTEGER DEFAULT 0,
        position_order INTEGER DEFAULT 0,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP
    )
    "#,
];

/// One additive column migration for databases created by older builds.
struct Migration {
    /// Table to introspect.
    table: &'static str,
    /// Column whose absence triggers the DDL.
    column: &'static str,
    /// The `ALTER TABLE ... ADD COLUMN` statement.
    ddl: &'static str,
}

/// Fixed, ordered migration list. **Never** reorder or edit entries —
/// append new ones and bump [`SCHEMA_VERSION`].
const MIGRATIONS: &[Migration] = &[
    Migration {
        table: "products",
        column: "barcode",
        ddl: "ALTER TABLE products ADD COLUMN barcode TEXT",
    },
    Migration {
        table: "cash_register",
        column: "expense_category",
        ddl: "ALTER TABLE cash_register ADD COLUMN expense_category TEXT",
    },
    Migration {
        table: "sale_items",
        column: "category_name",
        ddl: "ALTER TABLE sale_items ADD COLUMN category_name TEXT",
    },
    Migration {
        table: "sales",
        column: "client_id",
        ddl: "ALTER TABLE sales ADD COLUMN client_id INTEGER REFERENCES clients(id)",
    },
];

/// Creates all tables and applies pending additive migrations.
///
/// ## Failure Semantics
/// - Base `CREATE TABLE` failures are fatal (`DbError::SchemaFailed`): with
///   no tables there is nothing to degrade to.
/// - Individual migration failures are logged and swallowed; startup
///   continues with the feature that needs the column disabled.
///
/// Safe to call on every startup; a no-op once the schema is current.
pub async fn ensure_schema(pool: &SqlitePool) -> DbResult<()> {
    for ddl in BASE_TABLES {
        sqlx::query(ddl)
            .execute(pool)
            .await
            .map_err(|e| DbError::SchemaFailed(e.to_string()))?;
    }

    let version: i64 = sqlx::query_scalar("PRAGMA user_version")
        .fetch_one(pool)
        .await?;

    if version >= SCHEMA_VERSION {
        debug!(version, "Schema already current, skipping migrations");
        return Ok(());
    }

    let mut all_ok = true;

    for migration in MIGRATIONS {
        match apply_migration(pool, migration).await {
            Ok(applied) => {
                if applied {
                    info!(
                        table = migration.table,
                        column = migration.column,
                        "Migration applied"
                    );
                }
            }
            Err(e) => {
                // Degraded-but-functional: the store must still open.
                warn!(
                    table = migration.table,
                    column = migration.column,
                    error = %e,
                    "Migration failed, continuing startup"
                );
                all_ok = false;
            }
        }
    }

    if all_ok {
        // PRAGMA does not accept bind parameters; SCHEMA_VERSION is a
        // compile-time constant, not user input.
        sqlx::query(&format!("PRAGMA user_version = {SCHEMA_VERSION}"))
            .execute(pool)
            .await?;
        info!(version = SCHEMA_VERSION, "Schema is current");
    }

    Ok(())
}

/// Applies one migration if its column is missing. Returns whether DDL ran.
async fn apply_migration(pool: &SqlitePool, migration: &Migration) -> DbResult<bool> {
    if column_exists(pool, migration.table, migration.column).await? {
        return Ok(false);
    }

    sqlx::query(migration.ddl).execute(pool).await?;
    Ok(true)
}

/// Checks whether `column` exists on `table` via `PRAGMA table_info`.
async fn column_exists(pool: &SqlitePool, table: &str, column: &str) -> DbResult<bool> {
    // Table names here come from the static MIGRATIONS list, never callers.
    let rows = sqlx::query(&format!("PRAGMA table_info({table})"))
        .fetch_all(pool)
        .await?;

    for row in rows {
        let name: String = row.try_get("name")?;
        if name == column {
            return Ok(true);
        }
    }

    Ok(false)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_ensure_schema_is_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        // Database::new already ran it once; run twice more.
        ensure_schema(db.pool()).await.unwrap();
        ensure_schema(db.pool()).await.unwrap();

        let version: i64 = sqlx::query_scalar("PRAGMA user_version")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[tokio::test]
    async fn test_migrated_columns_present_and_unique() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        ensure_schema(db.pool()).await.unwrap();

        for migration in MIGRATIONS {
            let rows = sqlx::query(&format!("PRAGMA table_info({})", migration.table))
                .fetch_all(db.pool())
                .await
                .unwrap();
            let count = rows
                .iter()
                .filter(|r| r.get::<String, _>("name") == migration.column)
                .count();
            assert_eq!(count, 1, "{}.{}", migration.table, migration.column);
        }
    }

    #[tokio::test]
    async fn test_legacy_database_gains_columns() {
        // Simulate an old installation: products without barcode.
        let db = Database::new(DbConfig::in_memory().run_schema(false))
            .await
            .unwrap();

        sqlx::query(
            "CREATE TABLE products (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                category_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                supplier TEXT,
                cost_usd REAL DEFAULT 0,
                cost_ars REAL DEFAULT 0,
                price REAL NOT NULL,
                stock INTEGER DEFAULT 0,
                description TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
        )
        .execute(db.pool())
        .await
        .unwrap();

        ensure_schema(db.pool()).await.unwrap();

        assert!(column_exists(db.pool(), "products", "barcode")
            .await
            .unwrap());
    }
}
