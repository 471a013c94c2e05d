use crate::domain::resource::{FileResource, ResourceKind, WebsiteUrl};
use crate::error::{AppError, AppResult};
use crate::infrastructure::db::DbPool;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Persistence boundary for the per-user file and URL collections.
///
/// `set_active` carries the registry invariant: activating one entry and
/// deactivating its siblings is a single statement, never an
/// iterate-then-save sequence, so a crash can never leave two active
/// entries of the same kind.
#[async_trait]
pub trait ResourceRepository: Send + Sync {
    async fn insert_file(&self, file: &FileResource) -> AppResult<()>;
    async fn insert_url(&self, url: &WebsiteUrl) -> AppResult<()>;

    async fn list_files(&self, user_id: Uuid) -> AppResult<Vec<FileResource>>;
    async fn list_urls(&self, user_id: Uuid) -> AppResult<Vec<WebsiteUrl>>;

    async fn find_file(&self, user_id: Uuid, name: &str) -> AppResult<Option<FileResource>>;
    async fn find_active_file(&self, user_id: Uuid) -> AppResult<Option<FileResource>>;
    async fn find_active_url(&self, user_id: Uuid) -> AppResult<Option<WebsiteUrl>>;

    /// Activate the entry matching `identifier` (file name or URL value)
    /// and deactivate every sibling of the same kind in one write.
    /// Returns false when no entry matched; nothing is changed then.
    async fn set_active(
        &self,
        user_id: Uuid,
        kind: ResourceKind,
        identifier: &str,
    ) -> AppResult<bool>;

    /// Remove the entry; returns false when no entry matched
    async fn remove(&self, user_id: Uuid, kind: ResourceKind, identifier: &str)
        -> AppResult<bool>;
}

pub struct PgResourceRepository {
    pool: Arc<DbPool>,
}

impl PgResourceRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResourceRepository for PgResourceRepository {
    async fn insert_file(&self, file: &FileResource) -> AppResult<()> {
        let pool = self.pool.as_ref();
        sqlx::query(
            r#"
            INSERT INTO files (id, user_id, name, storage_key, content_type, is_active, uploaded_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(file.id)
        .bind(file.user_id)
        .bind(&file.name)
        .bind(&file.storage_key)
        .bind(&file.content_type)
        .bind(file.is_active)
        .bind(file.uploaded_at)
        .execute(pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict("File name already exists".to_string());
                }
            }
            AppError::Database(e)
        })?;

        Ok(())
    }

    async fn insert_url(&self, url: &WebsiteUrl) -> AppResult<()> {
        let pool = self.pool.as_ref();
        sqlx::query(
            r#"
            INSERT INTO website_urls (id, user_id, url, is_active, added_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(url.id)
        .bind(url.user_id)
        .bind(&url.url)
        .bind(url.is_active)
        .bind(url.added_at)
        .execute(pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict("URL already exists".to_string());
                }
            }
            AppError::Database(e)
        })?;

        Ok(())
    }

    async fn list_files(&self, user_id: Uuid) -> AppResult<Vec<FileResource>> {
        let pool = self.pool.as_ref();
        let files = sqlx::query_as::<_, FileResource>(
            r#"
            SELECT * FROM files
            WHERE user_id = $1
            ORDER BY uploaded_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(files)
    }

    async fn list_urls(&self, user_id: Uuid) -> AppResult<Vec<WebsiteUrl>> {
        let pool = self.pool.as_ref();
        let urls = sqlx::query_as::<_, WebsiteUrl>(
            r#"
            SELECT * FROM website_urls
            WHERE user_id = $1
            ORDER BY added_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(urls)
    }

    async fn find_file(&self, user_id: Uuid, name: &str) -> AppResult<Option<FileResource>> {
        let pool = self.pool.as_ref();
        let file = sqlx::query_as::<_, FileResource>(
            "SELECT * FROM files WHERE user_id = $1 AND name = $2",
        )
        .bind(user_id)
        .bind(name)
        .fetch_optional(pool)
        .await?;

        Ok(file)
    }

    async fn find_active_file(&self, user_id: Uuid) -> AppResult<Option<FileResource>> {
        let pool = self.pool.as_ref();
        let file = sqlx::query_as::<_, FileResource>(
            "SELECT * FROM files WHERE user_id = $1 AND is_active = TRUE",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(file)
    }

    async fn find_active_url(&self, user_id: Uuid) -> AppResult<Option<WebsiteUrl>> {
        let pool = self.pool.as_ref();
        let url = sqlx::query_as::<_, WebsiteUrl>(
            "SELECT * FROM website_urls WHERE user_id = $1 AND is_active = TRUE",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(url)
    }

    async fn set_active(
        &self,
        user_id: Uuid,
        kind: ResourceKind,
        identifier: &str,
    ) -> AppResult<bool> {
        let pool = self.pool.as_ref();
        // One statement over the whole kind: the target row becomes
        // active, every sibling inactive. When the target is missing the
        // EXISTS guard keeps the statement from touching anything.
        let query = match kind {
            ResourceKind::File => {
                r#"
                UPDATE files
                SET is_active = (name = $2)
                WHERE user_id = $1
                  AND EXISTS (SELECT 1 FROM files WHERE user_id = $1 AND name = $2)
                "#
            }
            ResourceKind::Url => {
                r#"
                UPDATE website_urls
                SET is_active = (url = $2)
                WHERE user_id = $1
                  AND EXISTS (SELECT 1 FROM website_urls WHERE user_id = $1 AND url = $2)
                "#
            }
        };

        let result = sqlx::query(query)
            .bind(user_id)
            .bind(identifier)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove(
        &self,
        user_id: Uuid,
        kind: ResourceKind,
        identifier: &str,
    ) -> AppResult<bool> {
        let pool = self.pool.as_ref();
        let query = match kind {
            ResourceKind::File => "DELETE FROM files WHERE user_id = $1 AND name = $2",
            ResourceKind::Url => "DELETE FROM website_urls WHERE user_id = $1 AND url = $2",
        };

        let result = sqlx::query(query)
            .bind(user_id)
            .bind(identifier)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
