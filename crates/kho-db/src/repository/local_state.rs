//! # Local State Repository
//!
//! String key-value pairs with an `updated_at` stamp. JSON helpers encode
//! structured values; typed helpers cover the keys the sale form uses.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;

use kho_core::{SALE_SUCCESS_MESSAGE_KEY, STAFF_STORE_ID_KEY};

use crate::error::{DbError, DbResult};

#[derive(Debug, Clone)]
pub struct LocalStateRepository {
    pool: SqlitePool,
}

impl LocalStateRepository {
    pub fn new(pool: SqlitePool) -> Self {
        LocalStateRepository { pool }
    }

    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM local_state WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(value)
    }

    /// Inserts or replaces a value.
    pub async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        debug!(key, "Writing local state");
        sqlx::query(
            r#"
            INSERT INTO local_state (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Removes a key; returns whether it existed.
    pub async fn remove(&self, key: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM local_state WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Reads and removes a value in one transaction.
    pub async fn take(&self, key: &str) -> DbResult<Option<String>> {
        let mut tx = self.pool.begin().await?;
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM local_state WHERE key = ?1")
                .bind(key)
                .fetch_optional(&mut *tx)
                .await?;
        if value.is_some() {
            sqlx::query("DELETE FROM local_state WHERE key = ?1")
                .bind(key)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(value)
    }

    /// Keys starting with `prefix`, sorted.
    pub async fn keys_with_prefix(&self, prefix: &str) -> DbResult<Vec<String>> {
        let pattern = format!("{}%", prefix.replace('%', "\\%").replace('_', "\\_"));
        let keys: Vec<String> = sqlx::query_scalar(
            "SELECT key FROM local_state WHERE key LIKE ?1 ESCAPE '\\' ORDER BY key",
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(keys)
    }

    // =========================================================================
    // JSON values
    // =========================================================================

    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> DbResult<Option<T>> {
        match self.get(key).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| DbError::invalid_value(key, e)),
            None => Ok(None),
        }
    }

    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T) -> DbResult<()> {
        let raw = serde_json::to_string(value).map_err(|e| DbError::invalid_value(key, e))?;
        self.set(key, &raw).await
    }

    // =========================================================================
    // Sale form keys
    // =========================================================================

    pub async fn staff_store_id(&self) -> DbResult<Option<String>> {
        self.get(STAFF_STORE_ID_KEY).await
    }

    pub async fn set_staff_store_id(&self, store_id: &str) -> DbResult<()> {
        self.set(STAFF_STORE_ID_KEY, store_id).await
    }

    /// Queues the banner shown after the next navigation.
    pub async fn set_sale_success_message(&self, message: &str) -> DbResult<()> {
        self.set(SALE_SUCCESS_MESSAGE_KEY, message).await
    }

    /// Pops the queued banner; it is shown once.
    pub async fn take_sale_success_message(&self) -> DbResult<Option<String>> {
        self.take(SALE_SUCCESS_MESSAGE_KEY).await
    }
}
