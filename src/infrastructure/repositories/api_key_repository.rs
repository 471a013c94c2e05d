use crate::domain::user::ApiKey;
use crate::error::{AppError, AppResult};
use crate::infrastructure::db::DbPool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

#[async_trait]
pub trait ApiKeyRepository: Send + Sync {
    async fn insert(&self, api_key: &ApiKey) -> AppResult<()>;
    async fn find_by_key(&self, key: &str) -> AppResult<Option<ApiKey>>;
    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Vec<ApiKey>>;

    /// Drop keys whose expiry has passed; stands in for store-level TTL
    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

pub struct PgApiKeyRepository {
    pool: Arc<DbPool>,
}

impl PgApiKeyRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApiKeyRepository for PgApiKeyRepository {
    async fn insert(&self, api_key: &ApiKey) -> AppResult<()> {
        let pool = self.pool.as_ref();
        sqlx::query(
            r#"
            INSERT INTO api_keys (id, user_id, name, key, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(api_key.id)
        .bind(api_key.user_id)
        .bind(&api_key.name)
        .bind(&api_key.key)
        .bind(api_key.expires_at)
        .bind(api_key.created_at)
        .execute(pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict("API key already exists".to_string());
                }
            }
            AppError::Database(e)
        })?;

        Ok(())
    }

    async fn find_by_key(&self, key: &str) -> AppResult<Option<ApiKey>> {
        let pool = self.pool.as_ref();
        let api_key = sqlx::query_as::<_, ApiKey>("SELECT * FROM api_keys WHERE key = $1")
            .bind(key)
            .fetch_optional(pool)
            .await?;

        Ok(api_key)
    }

    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Vec<ApiKey>> {
        let pool = self.pool.as_ref();
        let keys = sqlx::query_as::<_, ApiKey>(
            r#"
            SELECT * FROM api_keys
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(keys)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let pool = self.pool.as_ref();
        let result = sqlx::query("DELETE FROM api_keys WHERE expires_at < $1")
            .bind(now)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
