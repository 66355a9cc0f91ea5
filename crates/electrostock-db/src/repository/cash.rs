//! # Cash Register Repository
//!
//! The append-only money ledger. Sales and purchase payments post here from
//! their own transactions; this repository covers manual postings, listing,
//! per-currency balances and backup import/export.
//!
//! ## Balance
//! ```text
//! balance(currency) = Σ income - Σ expense     (over that currency only)
//! ```
//! An empty register answers `{income: 0, expense: 0, balance: 0}`, never
//! nulls.

use electrostock_core::{
    validation, Balance, CashEntry, CashEntrySummary, CoreError, Currency, EntryType,
    ImportMode, NewExpense, NewIncome,
};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::info;

use crate::error::DbResult;

/// Optional, conjunctive filters for the cash register list. Date bounds
/// compare against the stored `entry_date` text.
#[derive(Debug, Clone, Default)]
pub struct CashFilters {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub entry_type: Option<EntryType>,
    pub currency: Option<Currency>,
}

/// Repository for the cash register.
#[derive(Debug, Clone)]
pub struct CashRegisterRepository {
    pool: SqlitePool,
}

impl CashRegisterRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Lists entries newest first under the given filters. Entries linked to
    /// a sale carry the sold item names.
    pub async fn list(&self, filters: &CashFilters) -> DbResult<Vec<CashEntrySummary>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT cr.id, cr.entry_date, cr.type, cr.amount, cr.currency,
                    cr.payment_method, cr.description, cr.expense_category, cr.sale_id,
                    cr.created_at,
                    GROUP_CONCAT(DISTINCT si.category_name) AS category_names,
                    GROUP_CONCAT(si.product_name, ', ') AS product_names
             FROM cash_register cr
             LEFT JOIN sale_items si ON cr.sale_id = si.sale_id
             WHERE 1=1",
        );

        if let Some(start) = &filters.start_date {
            builder.push(" AND cr.entry_date >= ").push_bind(start);
        }
        if let Some(end) = &filters.end_date {
            builder.push(" AND cr.entry_date <= ").push_bind(end);
        }
        if let Some(entry_type) = filters.entry_type {
            builder.push(" AND cr.type = ").push_bind(entry_type);
        }
        if let Some(currency) = filters.currency {
            builder.push(" AND cr.currency = ").push_bind(currency);
        }

        builder.push(" GROUP BY cr.id ORDER BY cr.entry_date DESC, cr.id DESC");

        let entries = builder
            .build_query_as::<CashEntrySummary>()
            .fetch_all(&self.pool)
            .await?;

        Ok(entries)
    }

    /// Posts a manual expense. Uncategorized expenses land in 'otros'.
    pub async fn add_expense(&self, expense: &NewExpense) -> DbResult<i64> {
        validation::validate_positive_amount("amount", expense.amount)
            .map_err(CoreError::from)?;

        let result = sqlx::query(
            "INSERT INTO cash_register
                 (type, amount, currency, payment_method, description, expense_category)
             VALUES ('expense', ?, ?, ?, ?, ?)",
        )
        .bind(expense.amount)
        .bind(expense.currency)
        .bind(&expense.payment_method)
        .bind(&expense.description)
        .bind(expense.expense_category.as_deref().unwrap_or("otros"))
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Posts a manual income (money in that is not a sale).
    pub async fn add_income(&self, income: &NewIncome) -> DbResult<i64> {
        validation::validate_positive_amount("amount", income.amount)
            .map_err(CoreError::from)?;

        let result = sqlx::query(
            "INSERT INTO cash_register
                 (type, amount, currency, payment_method, description)
             VALUES ('income', ?, ?, ?, ?)",
        )
        .bind(income.amount)
        .bind(income.currency)
        .bind(&income.payment_method)
        .bind(&income.description)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Computes the running balance for one currency.
    pub async fn balance(&self, currency: Currency) -> DbResult<Balance> {
        let (income, expense): (f64, f64) = sqlx::query_as(
            "SELECT
                 COALESCE(SUM(CASE WHEN type = 'income' THEN amount ELSE 0.0 END), 0.0),
                 COALESCE(SUM(CASE WHEN type = 'expense' THEN amount ELSE 0.0 END), 0.0)
             FROM cash_register
             WHERE currency = ?",
        )
        .bind(currency)
        .fetch_one(&self.pool)
        .await?;

        Ok(Balance {
            income,
            expense,
            balance: income - expense,
        })
    }

    /// Exports every entry, oldest first, for backup.
    pub async fn export_all(&self) -> DbResult<Vec<CashEntry>> {
        let entries = sqlx::query_as::<_, CashEntry>(
            "SELECT * FROM cash_register ORDER BY entry_date ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Imports backup entries in one transaction. `Replace` clears the
    /// register first; either way, a failing row imports nothing. Returns
    /// how many rows were inserted.
    pub async fn import(
        &self,
        entries: &[electrostock_core::ImportedEntry],
        mode: ImportMode,
    ) -> DbResult<usize> {
        let mut tx = self.pool.begin().await?;

        if mode == ImportMode::Replace {
            sqlx::query("DELETE FROM cash_register").execute(&mut *tx).await?;
        }

        for entry in entries {
            sqlx::query(
                "INSERT INTO cash_register
                     (entry_date, type, amount, currency, payment_method, description,
                      expense_category, sale_id)
                 VALUES (COALESCE(?, CURRENT_TIMESTAMP), ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(entry.entry_date)
            .bind(entry.entry_type)
            .bind(entry.amount)
            .bind(entry.currency)
            .bind(&entry.payment_method)
            .bind(&entry.description)
            .bind(&entry.expense_category)
            .bind(entry.sale_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!(count = entries.len(), ?mode, "Cash register import committed");

        Ok(entries.len())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use electrostock_core::ImportedEntry;

    fn expense(amount: f64, currency: Currency) -> NewExpense {
        NewExpense {
            amount,
            currency,
            payment_method: Some("cash_ars".into()),
            description: Some("Limpieza".into()),
            expense_category: None,
        }
    }

    fn income(amount: f64, currency: Currency) -> NewIncome {
        NewIncome {
            amount,
            currency,
            payment_method: Some("cash_ars".into()),
            description: Some("Ajuste de caja".into()),
        }
    }

    #[tokio::test]
    async fn test_empty_register_balance_is_zero_filled() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let balance = db.cash_register().balance(Currency::Ars).await.unwrap();
        assert_eq!(
            balance,
            Balance {
                income: 0.0,
                expense: 0.0,
                balance: 0.0
            }
        );
    }

    #[tokio::test]
    async fn test_balances_never_mix_currencies() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.cash_register();

        repo.add_income(&income(10000.0, Currency::Ars)).await.unwrap();
        repo.add_expense(&expense(2500.0, Currency::Ars)).await.unwrap();
        repo.add_income(&income(100.0, Currency::Usd)).await.unwrap();

        let ars = repo.balance(Currency::Ars).await.unwrap();
        assert_eq!(ars.balance, 7500.0);

        let usd = repo.balance(Currency::Usd).await.unwrap();
        assert_eq!(usd.income, 100.0);
        assert_eq!(usd.expense, 0.0);
    }

    #[tokio::test]
    async fn test_uncategorized_expense_defaults_to_otros() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.cash_register()
            .add_expense(&expense(100.0, Currency::Ars))
            .await
            .unwrap();

        let category: String =
            sqlx::query_scalar("SELECT expense_category FROM cash_register")
                .fetch_one(db.pool())
                .await
                .unwrap();
        assert_eq!(category, "otros");
    }

    #[tokio::test]
    async fn test_list_filters_by_type_and_currency() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.cash_register();
        repo.add_income(&income(100.0, Currency::Ars)).await.unwrap();
        repo.add_expense(&expense(50.0, Currency::Ars)).await.unwrap();
        repo.add_income(&income(10.0, Currency::Usd)).await.unwrap();

        let expenses = repo
            .list(&CashFilters {
                entry_type: Some(EntryType::Expense),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].amount, 50.0);

        let usd = repo
            .list(&CashFilters {
                currency: Some(Currency::Usd),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(usd.len(), 1);
    }

    #[tokio::test]
    async fn test_export_import_replace_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.cash_register();
        repo.add_income(&income(100.0, Currency::Ars)).await.unwrap();
        repo.add_expense(&expense(40.0, Currency::Ars)).await.unwrap();

        let exported = repo.export_all().await.unwrap();
        assert_eq!(exported.len(), 2);

        let imported: Vec<ImportedEntry> = exported
            .iter()
            .map(|e| ImportedEntry {
                entry_date: Some(e.entry_date),
                entry_type: e.entry_type,
                amount: e.amount,
                currency: e.currency,
                payment_method: e.payment_method.clone(),
                description: e.description.clone(),
                expense_category: e.expense_category.clone(),
                sale_id: None,
            })
            .collect();

        // replace: same rows, not doubled
        repo.import(&imported, ImportMode::Replace).await.unwrap();
        assert_eq!(repo.export_all().await.unwrap().len(), 2);
        assert_eq!(repo.balance(Currency::Ars).await.unwrap().balance, 60.0);

        // append: doubled
        repo.import(&imported, ImportMode::Append).await.unwrap();
        assert_eq!(repo.export_all().await.unwrap().len(), 4);
        assert_eq!(repo.balance(Currency::Ars).await.unwrap().balance, 120.0);
    }
}
