use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::auth::ApiKeyManager;
use crate::error::AppError;
use crate::infrastructure::config::Config;
use crate::infrastructure::repositories::ApiKeyRepository;

pub const X_API_KEY: &str = "x-api-key";

/// Identity resolved from a verified API key. Carries the plan name the
/// key was sold under so billing needs no extra lookup.
#[derive(Debug, Clone)]
pub struct ApiKeyIdentity {
    pub user_id: Uuid,
    pub plan: String,
    pub order_id: String,
}

/// API-key middleware: signature check against the API-key secret, then
/// a store lookup and an expiry check. Both must pass.
pub async fn api_key_middleware(
    State((api_key_repo, config)): State<(Arc<dyn ApiKeyRepository>, Arc<Config>)>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = request
        .headers()
        .get(X_API_KEY)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Please provide an API key".to_string()))?
        .to_string();

    let manager = ApiKeyManager::new(config.api_key_secret.clone());
    let claims = manager.verify(&key)?;
    let user_id = claims.user_id()?;

    let stored = api_key_repo
        .find_by_key(&key)
        .await?
        .ok_or_else(|| AppError::NotFound("API key not found".to_string()))?;

    if stored.is_expired(Utc::now()) {
        return Err(AppError::Forbidden("API key has expired".to_string()));
    }

    request.extensions_mut().insert(ApiKeyIdentity {
        user_id,
        plan: claims.plan,
        order_id: claims.order_id,
    });

    Ok(next.run(request).await)
}
