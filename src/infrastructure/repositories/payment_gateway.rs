use async_trait::async_trait;

/// Payment gateway boundary.
///
/// `expected_signature` exposes the gateway's signing primitive - an
/// HMAC-SHA256 over `"{order_id}|{payment_id}"` with the shared secret -
/// so the payment service can compare it byte-for-byte against the
/// signature supplied by the client.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Gateway name recorded on subscriptions it paid for
    fn name(&self) -> &'static str;

    /// Create an order; returns the gateway order id
    async fn create_order(&self, amount: i64, currency: &str) -> Result<String, String>;

    /// Hex signature the gateway would have produced for this payment
    fn expected_signature(&self, order_id: &str, payment_id: &str) -> String;
}
