use crate::domain::user::User;
use crate::error::{AppError, AppResult};
use crate::infrastructure::db::DbPool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, user_id: Uuid) -> AppResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Create a password-credential user
    async fn create(&self, name: &str, email: &str, password_hash: &str) -> AppResult<User>;

    /// Create an OAuth user (no password hash)
    async fn create_oauth(
        &self,
        name: &str,
        email: &str,
        provider: &str,
        provider_id: &str,
        profile_picture: Option<&str>,
    ) -> AppResult<User>;

    /// Point the user at a new active plan and its expiry
    async fn set_active_plan(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()>;
}

pub struct PgUserRepository {
    pool: Arc<DbPool>,
}

impl PgUserRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let pool = self.pool.as_ref();
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let pool = self.pool.as_ref();
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    async fn create(&self, name: &str, email: &str, password_hash: &str) -> AppResult<User> {
        let pool = self.pool.as_ref();
        let id = Uuid::new_v4();
        let now = Utc::now();

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(now)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict("User already exists".to_string());
                }
            }
            AppError::Database(e)
        })?;

        Ok(user)
    }

    async fn create_oauth(
        &self,
        name: &str,
        email: &str,
        provider: &str,
        provider_id: &str,
        profile_picture: Option<&str>,
    ) -> AppResult<User> {
        let pool = self.pool.as_ref();
        let id = Uuid::new_v4();
        let now = Utc::now();

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, oauth_provider, oauth_provider_id, profile_picture, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(provider)
        .bind(provider_id)
        .bind(profile_picture)
        .bind(now)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict("User already exists".to_string());
                }
            }
            AppError::Database(e)
        })?;

        Ok(user)
    }

    async fn set_active_plan(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let pool = self.pool.as_ref();
        sqlx::query(
            r#"
            UPDATE users
            SET active_plan_id = $2, plan_expires_at = $3, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(plan_id)
        .bind(expires_at)
        .bind(Utc::now())
        .execute(pool)
        .await?;

        Ok(())
    }
}
