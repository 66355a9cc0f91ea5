//! # Client Repository
//!
//! Client CRUD plus the current-account ledger.
//!
//! ## Current Account Invariant
//! ```text
//! clients.debt  ==  Σ debits - Σ credits   (over client_movements)
//! ```
//! `debt` is a cache so lists never aggregate the ledger. Both sides are
//! written inside one transaction; a charge or payment that fails half-way
//! leaves neither a movement nor a debt change behind.

use electrostock_core::{
    validation, Client, ClientInput, ClientMovement, CoreError, MovementType,
    CLIENT_SEARCH_LIMIT,
};
use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};

/// Repository for clients and their current accounts.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    pool: SqlitePool,
}

impl ClientRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Lists all clients ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Client>> {
        let clients = sqlx::query_as::<_, Client>("SELECT * FROM clients ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(clients)
    }

    /// Fetches one client by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Client> {
        let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Client", id))?;

        Ok(client)
    }

    /// Searches clients by name, identifier or phone, capped at
    /// [`CLIENT_SEARCH_LIMIT`] rows.
    pub async fn search(&self, query: &str) -> DbResult<Vec<Client>> {
        let query = validation::validate_search_query(query).map_err(CoreError::from)?;
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let pattern = format!("%{query}%");
        let clients = sqlx::query_as::<_, Client>(
            "SELECT * FROM clients
             WHERE name LIKE ? OR identifier LIKE ? OR phone LIKE ?
             ORDER BY name
             LIMIT ?",
        )
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .bind(CLIENT_SEARCH_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(clients)
    }

    /// Creates a client with a zero balance and returns its id.
    pub async fn create(&self, client: &ClientInput) -> DbResult<i64> {
        validation::validate_name("name", &client.name).map_err(CoreError::from)?;

        let result = sqlx::query(
            "INSERT INTO clients (name, type, identifier, phone, email, address, notes)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(client.name.trim())
        .bind(client.client_type)
        .bind(&client.identifier)
        .bind(&client.phone)
        .bind(&client.email)
        .bind(&client.address)
        .bind(&client.notes)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Updates a client's contact fields. The balance is never set directly;
    /// it only moves through charges and payments.
    pub async fn update(&self, id: i64, client: &ClientInput) -> DbResult<()> {
        validation::validate_name("name", &client.name).map_err(CoreError::from)?;

        let result = sqlx::query(
            "UPDATE clients
             SET name = ?, type = ?, identifier = ?, phone = ?, email = ?, address = ?, notes = ?
             WHERE id = ?",
        )
        .bind(client.name.trim())
        .bind(client.client_type)
        .bind(&client.identifier)
        .bind(&client.phone)
        .bind(&client.email)
        .bind(&client.address)
        .bind(&client.notes)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Client", id));
        }

        Ok(())
    }

    /// Deletes a client and, via cascade, their movement history.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM clients WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Client", id));
        }

        Ok(())
    }

    // =========================================================================
    // Current Account
    // =========================================================================

    /// Extends store credit: records a debit movement and raises the client's
    /// debt, atomically. Returns the new balance.
    pub async fn add_charge(
        &self,
        client_id: i64,
        amount: f64,
        description: Option<&str>,
    ) -> DbResult<f64> {
        validation::validate_positive_amount("amount", amount).map_err(CoreError::from)?;

        self.apply_movement(client_id, MovementType::Debit, amount, description)
            .await
    }

    /// Registers a payment against the client's debt: records a credit
    /// movement and lowers the debt, atomically. Payments above the current
    /// debt are rejected — the account never goes negative. Returns the new
    /// balance.
    pub async fn register_payment(
        &self,
        client_id: i64,
        amount: f64,
        description: Option<&str>,
    ) -> DbResult<f64> {
        validation::validate_positive_amount("amount", amount).map_err(CoreError::from)?;

        self.apply_movement(client_id, MovementType::Credit, amount, description)
            .await
    }

    /// Lists a client's movements, newest first.
    pub async fn movements(&self, client_id: i64) -> DbResult<Vec<ClientMovement>> {
        let movements = sqlx::query_as::<_, ClientMovement>(
            "SELECT * FROM client_movements WHERE client_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Applies one signed movement to the ledger and the cached debt.
    ///
    /// The debt row is read inside the transaction, so concurrent movements
    /// serialize on SQLite's write lock and each `balance_after` snapshot is
    /// consistent.
    async fn apply_movement(
        &self,
        client_id: i64,
        movement_type: MovementType,
        amount: f64,
        description: Option<&str>,
    ) -> DbResult<f64> {
        let mut tx = self.pool.begin().await?;

        let debt: f64 = sqlx::query_scalar("SELECT debt FROM clients WHERE id = ?")
            .bind(client_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Client", client_id))?;

        let balance_after = match movement_type {
            MovementType::Debit => debt + amount,
            MovementType::Credit => {
                if amount > debt {
                    return Err(CoreError::PaymentExceedsBalance {
                        outstanding: debt,
                        requested: amount,
                    }
                    .into());
                }
                debt - amount
            }
        };

        sqlx::query(
            "INSERT INTO client_movements
                 (client_id, movement_type, amount, description, balance_after)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(client_id)
        .bind(movement_type)
        .bind(amount)
        .bind(description)
        .bind(balance_after)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE clients SET debt = ? WHERE id = ?")
            .bind(balance_after)
            .bind(client_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(balance_after)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use electrostock_core::ClientType;

    fn input(name: &str) -> ClientInput {
        ClientInput {
            name: name.to_string(),
            client_type: ClientType::Consumer,
            identifier: Some("20-12345678-9".to_string()),
            phone: Some("11-4444-0000".to_string()),
            email: None,
            address: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_new_client_starts_with_zero_debt() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let id = db.clients().create(&input("Ana")).await.unwrap();
        assert_eq!(db.clients().get_by_id(id).await.unwrap().debt, 0.0);
    }

    #[tokio::test]
    async fn test_charge_and_payment_move_the_balance() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let id = db.clients().create(&input("Ana")).await.unwrap();

        let balance = db
            .clients()
            .add_charge(id, 5000.0, Some("Venta fiada"))
            .await
            .unwrap();
        assert_eq!(balance, 5000.0);

        let balance = db
            .clients()
            .register_payment(id, 2000.0, None)
            .await
            .unwrap();
        assert_eq!(balance, 3000.0);

        assert_eq!(db.clients().get_by_id(id).await.unwrap().debt, 3000.0);
    }

    #[tokio::test]
    async fn test_overpayment_rejected_and_nothing_persists() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let id = db.clients().create(&input("Ana")).await.unwrap();
        db.clients().add_charge(id, 1000.0, None).await.unwrap();

        let err = db
            .clients()
            .register_payment(id, 1500.0, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::PaymentExceedsBalance { .. })
        ));

        // ledger untouched: one movement, debt unchanged
        assert_eq!(db.clients().movements(id).await.unwrap().len(), 1);
        assert_eq!(db.clients().get_by_id(id).await.unwrap().debt, 1000.0);
    }

    #[tokio::test]
    async fn test_movements_carry_balance_snapshots() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let id = db.clients().create(&input("Ana")).await.unwrap();

        db.clients().add_charge(id, 1000.0, None).await.unwrap();
        db.clients().add_charge(id, 500.0, None).await.unwrap();
        db.clients().register_payment(id, 300.0, None).await.unwrap();

        let movements = db.clients().movements(id).await.unwrap();
        // newest first
        let balances: Vec<f64> = movements.iter().map(|m| m.balance_after).collect();
        assert_eq!(balances, [1200.0, 1500.0, 1000.0]);
        assert_eq!(movements[0].movement_type, MovementType::Credit);
    }

    #[tokio::test]
    async fn test_debt_cache_matches_ledger_sum() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let id = db.clients().create(&input("Ana")).await.unwrap();

        db.clients().add_charge(id, 800.0, None).await.unwrap();
        db.clients().register_payment(id, 250.0, None).await.unwrap();
        db.clients().add_charge(id, 100.0, None).await.unwrap();

        let ledger_sum: f64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(CASE movement_type
                 WHEN 'debit' THEN amount ELSE -amount END), 0)
             FROM client_movements WHERE client_id = ?",
        )
        .bind(id)
        .fetch_one(db.pool())
        .await
        .unwrap();

        assert_eq!(db.clients().get_by_id(id).await.unwrap().debt, ledger_sum);
    }

    #[tokio::test]
    async fn test_search_is_bounded() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        for i in 0..25 {
            db.clients()
                .create(&input(&format!("Cliente {i:02}")))
                .await
                .unwrap();
        }

        let hits = db.clients().search("Cliente").await.unwrap();
        assert_eq!(hits.len() as i64, CLIENT_SEARCH_LIMIT);
    }
}
