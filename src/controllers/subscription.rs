use axum::{extract::State, Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::subscription::{Subscription, SubscriptionService},
    error::AppResult,
    infrastructure::auth::AuthUser,
    infrastructure::repositories::ApiKeyRepository,
};

#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    pub plan_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct SweepResponse {
    pub expired: u64,
    pub keys_evicted: u64,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    #[serde(flatten)]
    pub subscription: Subscription,
    pub credits_left: i64,
}

pub struct SubscriptionController {
    subscription_service: Arc<SubscriptionService>,
    api_key_repo: Arc<dyn ApiKeyRepository>,
}

impl SubscriptionController {
    pub fn new(
        subscription_service: Arc<SubscriptionService>,
        api_key_repo: Arc<dyn ApiKeyRepository>,
    ) -> Self {
        Self {
            subscription_service,
            api_key_repo,
        }
    }

    /// GET /api/subscription - The caller's active subscription
    pub async fn get_subscription(
        State(controller): State<Arc<SubscriptionController>>,
        Extension(auth_user): Extension<AuthUser>,
    ) -> AppResult<Json<SubscriptionResponse>> {
        let subscription = controller
            .subscription_service
            .get_active(auth_user.user_id)
            .await?;

        let credits_left = subscription.credits_left();
        Ok(Json(SubscriptionResponse {
            subscription,
            credits_left,
        }))
    }

    /// POST /api/subscription/cancel - Cancel the active subscription
    pub async fn cancel(
        State(controller): State<Arc<SubscriptionController>>,
        Extension(auth_user): Extension<AuthUser>,
        Json(request): Json<CancelRequest>,
    ) -> AppResult<Json<serde_json::Value>> {
        controller
            .subscription_service
            .cancel(auth_user.user_id, request.plan_id)
            .await?;

        Ok(Json(serde_json::json!({ "cancelled": true })))
    }

    /// POST /internal/subscriptions/sweep - Expiry sweep, triggered by an
    /// external scheduler. Also evicts API keys past their expiry.
    pub async fn sweep(
        State(controller): State<Arc<SubscriptionController>>,
    ) -> AppResult<Json<SweepResponse>> {
        let expired = controller.subscription_service.expire_due().await?;
        let keys_evicted = controller.api_key_repo.delete_expired(Utc::now()).await?;
        Ok(Json(SweepResponse {
            expired,
            keys_evicted,
        }))
    }
}
