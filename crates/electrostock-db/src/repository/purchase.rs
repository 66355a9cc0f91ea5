//! # Purchase Repository
//!
//! Supplier purchases and their payment plans.
//!
//! ## Money Flow
//! ```text
//! create_purchase(total 10000, paid 4000)
//!   ├── INSERT purchases      (paid_amount 4000, status 'partial')
//!   └── INSERT cash_register  (expense 4000, 'Compra #id - desc')
//!
//! add_payment(6000)
//!   ├── guard: 6000 <= pending balance (10000 - 4000)
//!   ├── INSERT purchase_payments
//!   ├── UPDATE purchases      (paid_amount 10000, status 'paid')
//!   └── INSERT cash_register  (expense 6000, 'Pago Compra #id')
//! ```
//! Each arrow group is one transaction. Only money actually handed over
//! becomes a cash expense; the unpaid balance is a liability, not a cash
//! event. `payment_status` is always recomputed from the amounts.

use electrostock_core::{
    validation, CoreError, NewPurchase, NewPurchasePayment, PaymentStatus, PurchasePayment,
    PurchaseWithSupplier,
};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::error::{DbError, DbResult};

/// Optional, conjunctive filters for the purchase list.
#[derive(Debug, Clone, Default)]
pub struct PurchaseFilters {
    pub supplier_id: Option<i64>,
    pub status: Option<PaymentStatus>,
}

/// Repository for purchases and purchase payments.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Records a purchase; when part of it was paid on the spot, the paid
    /// part also becomes a cash register expense. Returns the purchase id.
    pub async fn create_purchase(&self, purchase: &NewPurchase) -> DbResult<i64> {
        validation::validate_purchase(purchase)?;

        let status = PaymentStatus::from_amounts(purchase.total_amount, purchase.paid_amount);

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO purchases
                 (supplier_id, description, total_amount, paid_amount, payment_status,
                  due_date, notes)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(purchase.supplier_id)
        .bind(purchase.description.trim())
        .bind(purchase.total_amount)
        .bind(purchase.paid_amount)
        .bind(status)
        .bind(&purchase.due_date)
        .bind(&purchase.notes)
        .execute(&mut *tx)
        .await?;

        let purchase_id = result.last_insert_rowid();

        if purchase.paid_amount > 0.0 {
            sqlx::query(
                "INSERT INTO cash_register
                     (type, amount, currency, payment_method, description, expense_category)
                 VALUES ('expense', ?, ?, ?, ?, 'supplier_purchase')",
            )
            .bind(purchase.paid_amount)
            .bind(purchase.currency)
            .bind(purchase.payment_method.as_deref().unwrap_or("cash_ars"))
            .bind(format!(
                "Compra #{purchase_id} - {}",
                purchase.description.trim()
            ))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(purchase_id)
    }

    /// Lists purchases with supplier info, newest first, optionally filtered
    /// by supplier and/or settlement status.
    pub async fn list(&self, filters: &PurchaseFilters) -> DbResult<Vec<PurchaseWithSupplier>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT p.id, p.supplier_id, p.description, p.total_amount, p.paid_amount,
                    p.payment_status, p.purchase_date, p.due_date, p.notes,
                    s.name AS supplier_name, s.company AS supplier_company
             FROM purchases p
             JOIN suppliers s ON p.supplier_id = s.id
             WHERE 1=1",
        );

        if let Some(supplier_id) = filters.supplier_id {
            builder.push(" AND p.supplier_id = ").push_bind(supplier_id);
        }
        if let Some(status) = filters.status {
            builder.push(" AND p.payment_status = ").push_bind(status);
        }

        builder.push(" ORDER BY p.purchase_date DESC, p.id DESC");

        let purchases = builder
            .build_query_as::<PurchaseWithSupplier>()
            .fetch_all(&self.pool)
            .await?;

        Ok(purchases)
    }

    /// Fetches one purchase with supplier info.
    pub async fn get_by_id(&self, id: i64) -> DbResult<PurchaseWithSupplier> {
        let purchase = sqlx::query_as::<_, PurchaseWithSupplier>(
            "SELECT p.id, p.supplier_id, p.description, p.total_amount, p.paid_amount,
                    p.payment_status, p.purchase_date, p.due_date, p.notes,
                    s.name AS supplier_name, s.company AS supplier_company
             FROM purchases p
             JOIN suppliers s ON p.supplier_id = s.id
             WHERE p.id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Purchase", id))?;

        Ok(purchase)
    }

    /// Pays down a purchase. The payment row, the recomputed purchase
    /// amounts/status, and the cash expense commit together. Payments above
    /// the pending balance are rejected. Returns the new status.
    pub async fn add_payment(
        &self,
        purchase_id: i64,
        payment: &NewPurchasePayment,
    ) -> DbResult<PaymentStatus> {
        validation::validate_positive_amount("amount", payment.amount)
            .map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;

        let amounts: Option<(f64, f64)> = sqlx::query_as(
            "SELECT total_amount, paid_amount FROM purchases WHERE id = ?",
        )
        .bind(purchase_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((total_amount, paid_amount)) = amounts else {
            return Err(DbError::not_found("Purchase", purchase_id));
        };

        let outstanding = total_amount - paid_amount;
        if payment.amount > outstanding {
            return Err(CoreError::PaymentExceedsBalance {
                outstanding,
                requested: payment.amount,
            }
            .into());
        }

        sqlx::query(
            "INSERT INTO purchase_payments (purchase_id, amount, payment_method, notes)
             VALUES (?, ?, ?, ?)",
        )
        .bind(purchase_id)
        .bind(payment.amount)
        .bind(&payment.payment_method)
        .bind(&payment.notes)
        .execute(&mut *tx)
        .await?;

        let new_paid = paid_amount + payment.amount;
        let status = PaymentStatus::from_amounts(total_amount, new_paid);

        sqlx::query("UPDATE purchases SET paid_amount = ?, payment_status = ? WHERE id = ?")
            .bind(new_paid)
            .bind(status)
            .bind(purchase_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO cash_register
                 (type, amount, currency, payment_method, description, expense_category)
             VALUES ('expense', ?, ?, ?, ?, 'supplier_payment')",
        )
        .bind(payment.amount)
        .bind(payment.currency)
        .bind(payment.payment_method.as_deref().unwrap_or("cash_ars"))
        .bind(format!("Pago Compra #{purchase_id}"))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(status)
    }

    /// Lists a purchase's payments, newest first.
    pub async fn payments(&self, purchase_id: i64) -> DbResult<Vec<PurchasePayment>> {
        let payments = sqlx::query_as::<_, PurchasePayment>(
            "SELECT * FROM purchase_payments
             WHERE purchase_id = ?
             ORDER BY payment_date DESC, id DESC",
        )
        .bind(purchase_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use electrostock_core::{Currency, SupplierInput};

    async fn seed_supplier(db: &Database) -> i64 {
        db.suppliers()
            .create(&SupplierInput {
                name: "TecnoParts".into(),
                company: None,
                products_sold: None,
                contact_phone: None,
                shipping_methods: None,
                notes: None,
            })
            .await
            .unwrap()
    }

    fn purchase(supplier_id: i64, total: f64, paid: f64) -> NewPurchase {
        NewPurchase {
            supplier_id,
            description: "Reposición de stock".into(),
            total_amount: total,
            paid_amount: paid,
            currency: Currency::Ars,
            payment_method: Some("cash_ars".into()),
            due_date: None,
            notes: None,
        }
    }

    fn payment(amount: f64) -> NewPurchasePayment {
        NewPurchasePayment {
            amount,
            currency: Currency::Ars,
            payment_method: Some("transfer_ars".into()),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_partial_purchase_lifecycle() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let supplier_id = seed_supplier(&db).await;
        let repo = db.purchases();

        let id = repo
            .create_purchase(&purchase(supplier_id, 10000.0, 4000.0))
            .await
            .unwrap();

        let p = repo.get_by_id(id).await.unwrap();
        assert_eq!(p.payment_status, PaymentStatus::Partial);
        assert_eq!(p.supplier_name, "TecnoParts");

        // settle the remaining 6000
        let status = repo.add_payment(id, &payment(6000.0)).await.unwrap();
        assert_eq!(status, PaymentStatus::Paid);
        assert_eq!(repo.get_by_id(id).await.unwrap().paid_amount, 10000.0);

        // fully paid: even one more peso is rejected
        let err = repo.add_payment(id, &payment(1.0)).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::PaymentExceedsBalance { .. })
        ));
    }

    #[tokio::test]
    async fn test_only_paid_amount_hits_the_cash_register() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let supplier_id = seed_supplier(&db).await;

        db.purchases()
            .create_purchase(&purchase(supplier_id, 10000.0, 4000.0))
            .await
            .unwrap();

        let (expense, category): (f64, String) = sqlx::query_as(
            "SELECT amount, expense_category FROM cash_register WHERE type = 'expense'",
        )
        .fetch_one(db.pool())
        .await
        .unwrap();
        assert_eq!(expense, 4000.0);
        assert_eq!(category, "supplier_purchase");
    }

    #[tokio::test]
    async fn test_unpaid_purchase_writes_no_cash_entry() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let supplier_id = seed_supplier(&db).await;

        db.purchases()
            .create_purchase(&purchase(supplier_id, 10000.0, 0.0))
            .await
            .unwrap();

        let entries: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cash_register")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(entries, 0);
    }

    #[tokio::test]
    async fn test_rejected_payment_rolls_back_everything() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let supplier_id = seed_supplier(&db).await;
        let id = db
            .purchases()
            .create_purchase(&purchase(supplier_id, 1000.0, 0.0))
            .await
            .unwrap();

        assert!(db.purchases().add_payment(id, &payment(1500.0)).await.is_err());

        assert_eq!(db.purchases().payments(id).await.unwrap().len(), 0);
        assert_eq!(db.purchases().get_by_id(id).await.unwrap().paid_amount, 0.0);
        let entries: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cash_register")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(entries, 0);
    }

    #[tokio::test]
    async fn test_list_filters_are_conjunctive() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let a = seed_supplier(&db).await;
        let b = db
            .suppliers()
            .create(&SupplierInput {
                name: "Otro".into(),
                company: None,
                products_sold: None,
                contact_phone: None,
                shipping_methods: None,
                notes: None,
            })
            .await
            .unwrap();

        db.purchases().create_purchase(&purchase(a, 100.0, 100.0)).await.unwrap();
        db.purchases().create_purchase(&purchase(a, 100.0, 0.0)).await.unwrap();
        db.purchases().create_purchase(&purchase(b, 100.0, 0.0)).await.unwrap();

        let all = db.purchases().list(&PurchaseFilters::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let pending_of_a = db
            .purchases()
            .list(&PurchaseFilters {
                supplier_id: Some(a),
                status: Some(PaymentStatus::Pending),
            })
            .await
            .unwrap();
        assert_eq!(pending_of_a.len(), 1);
        assert_eq!(pending_of_a[0].supplier_id, a);
    }
}
