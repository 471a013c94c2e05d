use super::payment_gateway::PaymentGateway;
use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::json;
use sha2::Sha256;

const RAZORPAY_ORDERS_URL: &str = "https://api.razorpay.com/v1/orders";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: String,
}

/// Razorpay implementation: REST order creation with basic auth and the
/// documented `order_id|payment_id` HMAC-SHA256 signature scheme.
pub struct RazorpayGateway {
    key_id: String,
    key_secret: String,
    http_client: reqwest::Client,
}

impl RazorpayGateway {
    pub fn new(key_id: String, key_secret: String) -> Self {
        Self {
            key_id,
            key_secret,
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    fn name(&self) -> &'static str {
        "razorpay"
    }

    async fn create_order(&self, amount: i64, currency: &str) -> Result<String, String> {
        let receipt = format!("receipt_{}", Utc::now().timestamp_millis());

        let response = self
            .http_client
            .post(RAZORPAY_ORDERS_URL)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&json!({
                "amount": amount,
                "currency": currency,
                "receipt": receipt,
            }))
            .send()
            .await
            .map_err(|e| format!("Razorpay order creation failed: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(format!(
                "Razorpay order creation failed: HTTP {} {}",
                status, body
            ));
        }

        let order: OrderResponse = response
            .json()
            .await
            .map_err(|e| format!("failed to parse Razorpay order: {}", e))?;

        Ok(order.id)
    }

    fn expected_signature(&self, order_id: &str, payment_id: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.key_secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(format!("{}|{}", order_id, payment_id).as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}
