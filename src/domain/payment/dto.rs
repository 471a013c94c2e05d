use crate::domain::subscription::Subscription;
use crate::domain::user::ApiKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub amount: i64,
    pub currency: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateOrderResponse {
    pub order_id: String,
}

/// A claimed payment, as reported back by the checkout page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentClaim {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
    pub plan_id: Uuid,
    pub amount: i64,
}

/// Everything created by a successfully verified payment
#[derive(Debug, Serialize)]
pub struct PaymentVerified {
    pub api_key: ApiKey,
    pub subscription: Subscription,
    pub expires_at: DateTime<Utc>,
}
