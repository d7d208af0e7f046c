//! Repository trait definitions for testability and dependency injection.
//!
//! The authentication engine only talks to storage through these traits.
//! PostgreSQL implementations live here; in-memory ones live in
//! [`crate::db::memory`].

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

use super::timeouts::with_default_timeout;
use crate::auth::{Account, AccountId, AuthError, AuthResult, Session, SessionId, StorageError};

/// Account store
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Insert a new account
    ///
    /// # Errors
    ///
    /// * `AuthError::EmailTaken` - An account with this email already exists
    /// * `AuthError::Storage` - Any other persistence failure
    async fn create(&self, account: &Account) -> AuthResult<()>;

    /// Find account by ID
    async fn find_by_id(&self, id: AccountId) -> AuthResult<Option<Account>>;

    /// Find account by email (exact match)
    async fn find_by_email(&self, email: &str) -> AuthResult<Option<Account>>;
}

/// Refresh session store
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Insert a new session
    async fn create(&self, session: &Session) -> AuthResult<()>;

    /// Find session by its refresh token value
    async fn find_by_token(&self, token: &str) -> AuthResult<Option<Session>>;

    /// Unconditionally mark a session revoked
    async fn revoke(&self, id: SessionId) -> AuthResult<()>;

    /// Atomically revoke a session only if it is not revoked yet.
    ///
    /// Returns `true` when this call flipped the flag, `false` when the
    /// session was already revoked (or does not exist).
    async fn revoke_if_active(&self, id: SessionId) -> AuthResult<bool>;
}

/// PostgreSQL implementation of `AccountRepository`
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn account_from_row(r: &PgRow) -> Account {
    Account {
        id: r.get("id"),
        email: r.get("email"),
        password_hash: r.get("password_hash"),
        created_at: r.get("created_at"),
    }
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn create(&self, account: &Account) -> AuthResult<()> {
        let result = with_default_timeout(
            sqlx::query(
                "INSERT INTO accounts (id, email, password_hash, created_at) VALUES ($1, $2, $3, $4)",
            )
            .bind(account.id)
            .bind(&account.email)
            .bind(&account.password_hash)
            .bind(account.created_at)
            .execute(&self.pool),
        )
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(StorageError::Database(sqlx::Error::Database(e))) if e.is_unique_violation() => {
                Err(AuthError::EmailTaken)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(&self, id: AccountId) -> AuthResult<Option<Account>> {
        let row = with_default_timeout(
            sqlx::query("SELECT id, email, password_hash, created_at FROM accounts WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.as_ref().map(account_from_row))
    }

    async fn find_by_email(&self, email: &str) -> AuthResult<Option<Account>> {
        let row = with_default_timeout(
            sqlx::query(
                "SELECT id, email, password_hash, created_at FROM accounts WHERE email = $1",
            )
            .bind(email)
            .fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.as_ref().map(account_from_row))
    }
}

/// PostgreSQL implementation of `SessionRepository`
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn create(&self, session: &Session) -> AuthResult<()> {
        with_default_timeout(
            sqlx::query(
                r#"
                INSERT INTO refresh_sessions (id, account_id, token, expires_at, is_revoked, created_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(session.id)
            .bind(session.account_id)
            .bind(&session.token)
            .bind(session.expires_at)
            .bind(session.is_revoked)
            .bind(session.created_at)
            .execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> AuthResult<Option<Session>> {
        let row = with_default_timeout(
            sqlx::query(
                r#"
                SELECT id, account_id, token, expires_at, is_revoked, created_at
                FROM refresh_sessions
                WHERE token = $1
                "#,
            )
            .bind(token)
            .fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.map(|r| Session {
            id: r.get("id"),
            account_id: r.get("account_id"),
            token: r.get("token"),
            expires_at: r.get("expires_at"),
            is_revoked: r.get("is_revoked"),
            created_at: r.get("created_at"),
        }))
    }

    async fn revoke(&self, id: SessionId) -> AuthResult<()> {
        with_default_timeout(
            sqlx::query("UPDATE refresh_sessions SET is_revoked = TRUE WHERE id = $1")
                .bind(id)
                .execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    async fn revoke_if_active(&self, id: SessionId) -> AuthResult<bool> {
        let result = with_default_timeout(
            sqlx::query(
                "UPDATE refresh_sessions SET is_revoked = TRUE WHERE id = $1 AND is_revoked = FALSE",
            )
            .bind(id)
            .execute(&self.pool),
        )
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
