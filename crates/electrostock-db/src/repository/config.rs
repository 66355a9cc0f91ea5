//! # Configuration Repository
//!
//! Payment method surcharges and the store's key/value configuration.
//!
//! Both tables are seeded once on first run. Payment methods are a fixed set
//! afterwards (only the surcharge is editable); store config accepts
//! arbitrary keys via upsert.

use std::collections::HashMap;

use electrostock_core::{PaymentConfig, StoreConfigEntry};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DbError, DbResult};

/// Payment methods seeded on first run, with their default surcharge
/// percentages.
const PAYMENT_SEEDS: &[(&str, f64, &str)] = &[
    ("cash_ars", 0.0, "Efectivo (ARS)"),
    ("cash_usd", 0.0, "Efectivo (USD)"),
    ("transfer_ars", 0.0, "Transferencia (ARS)"),
    ("transfer_usd", 0.0, "Transferencia (USD)"),
    ("qr", 10.0, "QR"),
    ("debit", 10.0, "Tarjeta de Débito"),
    ("credit_1", 0.0, "Crédito 1 cuota"),
    ("credit_3", 15.0, "Crédito 3 cuotas"),
    ("credit_6", 25.0, "Crédito 6 cuotas"),
    ("credit_12", 40.0, "Crédito 12 cuotas"),
    ("link", 0.0, "Link de Pago"),
];

/// Store configuration keys seeded on first run. Placeholder values; the
/// settings screen overwrites them.
const STORE_SEEDS: &[(&str, &str)] = &[
    ("store_name", "Mi Negocio"),
    ("store_address", "Dirección del local"),
    ("store_phone", "000-000-0000"),
    ("store_logo", ""),
    ("receipt_message", "¡Gracias por su compra!"),
    (
        "return_policy",
        "Cambios y devoluciones dentro de los 30 días con ticket.",
    ),
];

/// Repository for payment and store configuration.
#[derive(Debug, Clone)]
pub struct ConfigRepository {
    pool: SqlitePool,
}

impl ConfigRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Seeds defaults. Runs on every startup, inserts only what is missing.
    ///
    /// Payment methods seed all-or-nothing (only when the table is empty, so
    /// a deliberately trimmed set stays trimmed); store config keys seed
    /// individually so new keys appear on upgrade without clobbering edits.
    pub async fn seed_defaults(&self) -> DbResult<()> {
        let payment_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payment_config")
            .fetch_one(&self.pool)
            .await?;

        if payment_count == 0 {
            for (method, surcharge, display_name) in PAYMENT_SEEDS {
                sqlx::query(
                    "INSERT INTO payment_config (method, surcharge, display_name)
                     VALUES (?, ?, ?)",
                )
                .bind(method)
                .bind(surcharge)
                .bind(display_name)
                .execute(&self.pool)
                .await?;
            }
            info!("Payment configuration seeded");
        }

        for (key, value) in STORE_SEEDS {
            sqlx::query("INSERT OR IGNORE INTO store_config (key, value) VALUES (?, ?)")
                .bind(key)
                .bind(value)
                .execute(&self.pool)
                .await?;
        }

        Ok(())
    }

    // =========================================================================
    // Payment Config
    // =========================================================================

    /// Lists all payment methods with their surcharges.
    pub async fn payment_configs(&self) -> DbResult<Vec<PaymentConfig>> {
        let configs = sqlx::query_as::<_, PaymentConfig>(
            "SELECT id, method, surcharge, display_name FROM payment_config ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(configs)
    }

    /// Updates the surcharge percentage of one payment method.
    pub async fn update_surcharge(&self, method: &str, surcharge: f64) -> DbResult<()> {
        let result = sqlx::query("UPDATE payment_config SET surcharge = ? WHERE method = ?")
            .bind(surcharge)
            .bind(method)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("PaymentConfig", method));
        }

        Ok(())
    }

    // =========================================================================
    // Store Config
    // =========================================================================

    /// Returns the whole store configuration as a key → value map.
    pub async fn store_config(&self) -> DbResult<HashMap<String, Option<String>>> {
        let rows = sqlx::query_as::<_, StoreConfigEntry>("SELECT key, value FROM store_config")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|r| (r.key, r.value)).collect())
    }

    /// Sets one store configuration key, inserting or replacing as needed.
    pub async fn set_store_config(&self, key: &str, value: &str) -> DbResult<()> {
        sqlx::query("INSERT OR REPLACE INTO store_config (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_payment_seeds_once() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        // Second seed run must not duplicate.
        db.config().seed_defaults().await.unwrap();

        let configs = db.config().payment_configs().await.unwrap();
        assert_eq!(configs.len(), 11);
        assert_eq!(configs[0].method, "cash_ars");
        assert_eq!(configs[0].surcharge, 0.0);

        let credit_12 = configs.iter().find(|c| c.method == "credit_12").unwrap();
        assert_eq!(credit_12.surcharge, 40.0);
    }

    #[tokio::test]
    async fn test_update_surcharge() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        db.config().update_surcharge("debit", 12.5).await.unwrap();
        let configs = db.config().payment_configs().await.unwrap();
        let debit = configs.iter().find(|c| c.method == "debit").unwrap();
        assert_eq!(debit.surcharge, 12.5);

        let err = db.config().update_surcharge("bitcoin", 1.0).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_store_config_upsert_and_seed_preservation() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let config = db.config().store_config().await.unwrap();
        assert_eq!(config["store_name"].as_deref(), Some("Mi Negocio"));

        db.config()
            .set_store_config("store_name", "ElectroStock")
            .await
            .unwrap();
        // arbitrary new keys are accepted
        db.config()
            .set_store_config("theme", "dark")
            .await
            .unwrap();

        // re-seeding must not overwrite user edits
        db.config().seed_defaults().await.unwrap();

        let config = db.config().store_config().await.unwrap();
        assert_eq!(config["store_name"].as_deref(), Some("ElectroStock"));
        assert_eq!(config["theme"].as_deref(), Some("dark"));
    }
}
