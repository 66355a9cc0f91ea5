//! # User Repository
//!
//! The credential store. Passwords are hashed with Argon2id; plaintext never
//! touches the database and never leaves this module.
//!
//! ## Login Flow
//! ```text
//! validate_user(username, password)
//!       │
//!       ▼
//! SELECT ... WHERE username = ? AND active = 1
//!       │
//!       ├── no row → Ok(None)          ← same answer as a bad password:
//!       │                                 no username enumeration
//!       ▼
//! Argon2::verify_password(password, stored PHC hash)
//!       │
//!       ├── mismatch → Ok(None)
//!       ▼
//! Ok(Some(UserAccount))               ← never carries hash or salt
//! ```

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString};
use argon2::{Argon2, PasswordVerifier};
use electrostock_core::{NewUser, Role, UserAccount, UserUpdate};
use sqlx::SqlitePool;
use tracing::warn;

use crate::error::{DbError, DbResult};

const USER_COLUMNS: &str = "id, username, role, name, active, created_at";

/// Default credentials created when the users table is empty, so a fresh
/// installation can log in at all. The UI nags until the password changes.
const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "123";

/// Repository for user accounts and authentication.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Lists all accounts, newest first. No secrets in the result.
    pub async fn list(&self) -> DbResult<Vec<UserAccount>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC");
        let users = sqlx::query_as::<_, UserAccount>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    /// Fetches one account by id. No secrets in the result.
    pub async fn get_by_id(&self, id: i64) -> DbResult<UserAccount> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let user = sqlx::query_as::<_, UserAccount>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))?;

        Ok(user)
    }

    /// Creates an account and returns its id.
    pub async fn create(&self, user: &NewUser) -> DbResult<i64> {
        let username = user.username.trim();
        if username.is_empty() || user.password.is_empty() {
            return Err(DbError::Internal(
                "username and password are required".to_string(),
            ));
        }

        let (hash, salt) = hash_password(&user.password)?;

        let result = sqlx::query(
            "INSERT INTO users (username, password_hash, salt, role, name)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(username)
        .bind(hash)
        .bind(salt)
        .bind(user.role)
        .bind(&user.name)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Checks a username/password pair.
    ///
    /// Returns the account on success and `None` on any failure — unknown
    /// username, wrong password, or deactivated account all look the same to
    /// the caller.
    pub async fn validate_user(
        &self,
        username: &str,
        password: &str,
    ) -> DbResult<Option<UserAccount>> {
        let sql = format!(
            "SELECT {USER_COLUMNS}, password_hash
             FROM users WHERE username = ? AND active = 1"
        );
        let row = sqlx::query_as::<_, CredentialRow>(&sql)
            .bind(username.trim())
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        if !verify_password(password, &row.password_hash) {
            return Ok(None);
        }

        Ok(Some(UserAccount {
            id: row.id,
            username: row.username,
            role: row.role,
            name: row.name,
            active: row.active,
            created_at: row.created_at,
        }))
    }

    /// Updates an account. When `password` is present the stored hash is
    /// replaced; otherwise it is left untouched.
    pub async fn update(&self, id: i64, update: &UserUpdate) -> DbResult<()> {
        let result = match update.password.as_deref().filter(|p| !p.is_empty()) {
            Some(password) => {
                let (hash, salt) = hash_password(password)?;
                sqlx::query(
                    "UPDATE users
                     SET password_hash = ?, salt = ?, role = ?, name = ?, active = ?
                     WHERE id = ?",
                )
                .bind(hash)
                .bind(salt)
                .bind(update.role)
                .bind(&update.name)
                .bind(update.active)
                .bind(id)
                .execute(&self.pool)
                .await?
            }
            None => {
                sqlx::query("UPDATE users SET role = ?, name = ?, active = ? WHERE id = ?")
                    .bind(update.role)
                    .bind(&update.name)
                    .bind(update.active)
                    .bind(id)
                    .execute(&self.pool)
                    .await?
            }
        };

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        Ok(())
    }

    /// Deletes an account.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        Ok(())
    }

    /// Creates the bootstrap admin when the users table is empty.
    ///
    /// Runs on every startup; a no-op once any account exists (including
    /// after the default admin is renamed or deleted with a replacement).
    pub async fn ensure_default_admin(&self) -> DbResult<()> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        if count > 0 {
            return Ok(());
        }

        self.create(&NewUser {
            username: DEFAULT_ADMIN_USERNAME.to_string(),
            password: DEFAULT_ADMIN_PASSWORD.to_string(),
            role: Role::Admin,
            name: Some("Administrador".to_string()),
        })
        .await?;

        warn!("No users found; created default admin account — change its password");
        Ok(())
    }
}

/// Internal row carrying the stored hash; never leaves this module.
#[derive(sqlx::FromRow)]
struct CredentialRow {
    id: i64,
    username: String,
    role: Role,
    name: Option<String>,
    active: bool,
    created_at: chrono::NaiveDateTime,
    password_hash: String,
}

/// Hashes a password with Argon2id and a fresh random salt.
///
/// Returns `(phc_hash, salt)`. The PHC string already embeds the salt; the
/// separate salt column exists for compatibility with the original data
/// layout and is not consulted on verify.
fn hash_password(password: &str) -> DbResult<(String, String)> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DbError::Hashing(e.to_string()))?
        .to_string();

    Ok((hash, salt.to_string()))
}

/// Verifies a password against a stored PHC hash string.
fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

// =============================================================================
// Unit Tests
// =============================================================================
