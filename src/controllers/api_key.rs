use axum::{extract::State, Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::{
    domain::auth::ApiKeyManager,
    domain::user::ApiKey,
    error::{AppError, AppResult},
    infrastructure::auth::AuthUser,
    infrastructure::repositories::ApiKeyRepository,
};

#[derive(Debug, Deserialize)]
pub struct VerifyKeyRequest {
    pub api_key: String,
}

#[derive(Debug, Serialize)]
pub struct KeySummary {
    pub id: uuid::Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub expires_at: chrono::DateTime<Utc>,
    pub created_at: chrono::DateTime<Utc>,
}

impl From<ApiKey> for KeySummary {
    fn from(key: ApiKey) -> Self {
        Self {
            id: key.id,
            name: key.name,
            expires_at: key.expires_at,
            created_at: key.created_at,
        }
    }
}

pub struct ApiKeyController {
    api_key_repo: Arc<dyn ApiKeyRepository>,
    api_key_manager: ApiKeyManager,
}

impl ApiKeyController {
    pub fn new(api_key_repo: Arc<dyn ApiKeyRepository>, api_key_manager: ApiKeyManager) -> Self {
        Self {
            api_key_repo,
            api_key_manager,
        }
    }

    /// POST /api/keys/verify - Check an API key's signature, existence
    /// and expiry
    pub async fn verify_key(
        State(controller): State<Arc<ApiKeyController>>,
        Json(request): Json<VerifyKeyRequest>,
    ) -> AppResult<Json<serde_json::Value>> {
        if request.api_key.is_empty() {
            return Err(AppError::BadRequest(
                "Please provide an API key".to_string(),
            ));
        }

        let claims = controller.api_key_manager.verify(&request.api_key)?;
        let user_id = claims.user_id()?;

        let stored = controller
            .api_key_repo
            .find_by_key(&request.api_key)
            .await?
            .ok_or_else(|| AppError::NotFound("API key not found".to_string()))?;

        if stored.is_expired(Utc::now()) {
            return Err(AppError::Forbidden("API key has expired".to_string()));
        }

        Ok(Json(json!({
            "valid": true,
            "user_id": user_id,
            "plan": claims.plan,
            "order_id": claims.order_id,
            "expires_at": stored.expires_at,
        })))
    }

    /// GET /api/keys - List the caller's API keys (the key material
    /// itself is never returned)
    pub async fn list_keys(
        State(controller): State<Arc<ApiKeyController>>,
        Extension(auth_user): Extension<AuthUser>,
    ) -> AppResult<Json<Vec<KeySummary>>> {
        let keys = controller
            .api_key_repo
            .find_by_user(auth_user.user_id)
            .await?;

        Ok(Json(keys.into_iter().map(KeySummary::from).collect()))
    }
}
