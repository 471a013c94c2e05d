use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The two independently managed resource kinds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    File,
    Url,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::File => write!(f, "file"),
            ResourceKind::Url => write!(f, "url"),
        }
    }
}

/// An uploaded file owned by a user. `storage_key` is the opaque locator
/// returned by the storage collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FileResource {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub storage_key: String,
    pub content_type: String,
    pub is_active: bool,
    pub uploaded_at: DateTime<Utc>,
}

/// A website URL registered by a user for retrieval
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WebsiteUrl {
    pub id: Uuid,
    pub user_id: Uuid,
    pub url: String,
    pub is_active: bool,
    pub added_at: DateTime<Utc>,
}
