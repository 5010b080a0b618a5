//! PostgreSQL-backed identity and account stores.

use async_trait::async_trait;
use chrono::Utc;
use service_core::error::AppError;
use sqlx::postgres::PgPool;
use uuid::Uuid;

use crate::models::Account;
use crate::services::{AccountStore, IdentityStore, StoreError};
use crate::utils::{hash_password, verify_password, Password, PasswordHashString};

/// History rows kept per account when no retention is configured.
const DEFAULT_HISTORY_RETENTION: usize = 5;

/// PostgreSQL database wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
    history_retention: usize,
}

impl Database {
    /// Create a new database wrapper from a connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            history_retention: DEFAULT_HISTORY_RETENTION,
        }
    }

    /// Keep at most `retention` history rows per account. The current
    /// credential's row is always kept.
    pub fn with_history_retention(mut self, retention: usize) -> Self {
        self.history_retention = retention.max(1);
        self
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health.
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Database health check failed: {}", e);
                AppError::DatabaseError(anyhow::anyhow!("Database health check failed: {}", e))
            })?;
        Ok(())
    }

    async fn current_hash(&self, account_id: Uuid) -> Result<Option<PasswordHashString>, StoreError> {
        let hash = sqlx::query_scalar::<_, String>(
            "SELECT password_hash FROM account_credentials WHERE account_id = $1",
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(hash.map(PasswordHashString::new))
    }
}

// ==================== Identity Operations ====================

#[async_trait]
impl IdentityStore for Database {
    async fn password_history(
        &self,
        account_id: Uuid,
        depth: usize,
    ) -> Result<Vec<PasswordHashString>, StoreError> {
        let hashes = sqlx::query_scalar::<_, String>(
            r#"
            SELECT password_hash FROM password_history
            WHERE account_id = $1
            ORDER BY created_utc DESC
            LIMIT $2
            "#,
        )
        .bind(account_id)
        .bind(i64::try_from(depth).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        Ok(hashes.into_iter().map(PasswordHashString::new).collect())
    }

    async fn verify_password(
        &self,
        account_id: Uuid,
        password: &Password,
    ) -> Result<bool, StoreError> {
        let Some(hash) = self.current_hash(account_id).await? else {
            return Ok(false);
        };

        let candidate = Password::new(password.as_str().to_string());
        tokio::task::spawn_blocking(move || verify_password(&candidate, &hash).is_ok())
            .await
            .map_err(|e| StoreError::Internal(anyhow::anyhow!("Verification task failed: {}", e)))
    }

    async fn set_password(&self, account_id: Uuid, password: &Password) -> Result<(), StoreError> {
        let candidate = Password::new(password.as_str().to_string());
        let hash = tokio::task::spawn_blocking(move || hash_password(&candidate))
            .await
            .map_err(|e| StoreError::Internal(anyhow::anyhow!("Hashing task failed: {}", e)))?
            .map_err(|e| StoreError::Hashing(e.to_string()))?
            .into_string();
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO account_credentials (account_id, password_hash, updated_utc)
            VALUES ($1, $2, $3)
            ON CONFLICT (account_id)
            DO UPDATE SET password_hash = EXCLUDED.password_hash, updated_utc = EXCLUDED.updated_utc
            "#,
        )
        .bind(account_id)
        .bind(&hash)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO password_history (history_id, account_id, password_hash, created_utc)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(account_id)
        .bind(&hash)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            DELETE FROM password_history
            WHERE account_id = $1
              AND history_id NOT IN (
                SELECT history_id FROM password_history
                WHERE account_id = $1
                ORDER BY created_utc DESC
                LIMIT $2
              )
            "#,
        )
        .bind(account_id)
        .bind(i64::try_from(self.history_retention).unwrap_or(i64::MAX))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

// ==================== Account Operations ====================

#[async_trait]
impl AccountStore for Database {
    async fn load(&self, account_id: Uuid) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT account_id, email, display_name, locale, is_approved, created_utc, updated_utc
            FROM accounts WHERE account_id = $1
            "#,
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }

    async fn save(&self, account: &Account) -> Result<(), StoreError> {
        // Approval is sticky: a stale write can't flip it back to pending.
        sqlx::query(
            r#"
            INSERT INTO accounts (account_id, email, display_name, locale, is_approved, created_utc, updated_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (account_id)
            DO UPDATE SET
                email = EXCLUDED.email,
                display_name = EXCLUDED.display_name,
                locale = EXCLUDED.locale,
                is_approved = accounts.is_approved OR EXCLUDED.is_approved,
                updated_utc = EXCLUDED.updated_utc
            "#,
        )
        .bind(account.account_id)
        .bind(&account.email)
        .bind(&account.display_name)
        .bind(&account.locale)
        .bind(account.is_approved)
        .bind(account.created_utc)
        .bind(account.updated_utc)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
