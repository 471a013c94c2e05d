use super::dto::{PaymentClaim, PaymentVerified};
use super::error::PaymentError;
use crate::domain::auth::ApiKeyManager;
use crate::domain::subscription::{PaymentRecord, SubscriptionService};
use crate::domain::user::ApiKey;
use crate::infrastructure::repositories::{
    ApiKeyRepository, PaymentGateway, PlanRepository, UserRepository,
};
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Payment orders and verification.
///
/// The signature comparison is the sole gate in front of subscription and
/// API-key creation: nothing is written until the supplied signature
/// matches the gateway's HMAC over `order_id|payment_id` exactly.
pub struct PaymentService {
    gateway: Arc<dyn PaymentGateway>,
    plan_repo: Arc<dyn PlanRepository>,
    user_repo: Arc<dyn UserRepository>,
    api_key_repo: Arc<dyn ApiKeyRepository>,
    subscription_service: Arc<SubscriptionService>,
    api_key_manager: ApiKeyManager,
}

impl PaymentService {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        plan_repo: Arc<dyn PlanRepository>,
        user_repo: Arc<dyn UserRepository>,
        api_key_repo: Arc<dyn ApiKeyRepository>,
        subscription_service: Arc<SubscriptionService>,
        api_key_manager: ApiKeyManager,
    ) -> Self {
        Self {
            gateway,
            plan_repo,
            user_repo,
            api_key_repo,
            subscription_service,
            api_key_manager,
        }
    }

    pub async fn create_order(
        &self,
        amount: i64,
        currency: &str,
    ) -> Result<String, PaymentError> {
        if amount <= 0 {
            return Err(PaymentError::Invalid(
                "amount must be positive".to_string(),
            ));
        }
        if currency.is_empty() {
            return Err(PaymentError::Invalid("currency is required".to_string()));
        }

        self.gateway
            .create_order(amount, currency)
            .await
            .map_err(PaymentError::Gateway)
    }

    /// Verify a claimed payment and activate the paid plan.
    ///
    /// On success, in order: issue and persist the signed API key, point
    /// the user at the new plan, create the subscription with its payment
    /// record. On a signature mismatch nothing is created or mutated.
    pub async fn verify_and_activate(
        &self,
        user_id: Uuid,
        claim: PaymentClaim,
    ) -> Result<PaymentVerified, PaymentError> {
        if claim.order_id.is_empty() || claim.payment_id.is_empty() || claim.signature.is_empty() {
            return Err(PaymentError::Invalid(
                "Missing required parameters".to_string(),
            ));
        }

        let expected = self
            .gateway
            .expected_signature(&claim.order_id, &claim.payment_id);
        if expected != claim.signature {
            tracing::warn!(
                user_id = %user_id,
                order_id = %claim.order_id,
                "Payment signature mismatch"
            );
            return Err(PaymentError::VerificationFailed);
        }

        let plan = self
            .plan_repo
            .find_by_id(claim.plan_id)
            .await
            .map_err(PaymentError::from)?
            .ok_or(PaymentError::PlanNotFound)?;

        let now = Utc::now();
        let expires_at = now + Duration::days(plan.duration_days as i64);

        let key = self
            .api_key_manager
            .issue(user_id, &plan.name.to_string(), &claim.order_id, expires_at)
            .map_err(PaymentError::from)?;

        let api_key = ApiKey {
            id: Uuid::new_v4(),
            user_id,
            name: Some(format!("{}-plan", plan.name)),
            key,
            expires_at,
            created_at: now,
        };
        self.api_key_repo
            .insert(&api_key)
            .await
            .map_err(PaymentError::from)?;

        self.user_repo
            .set_active_plan(user_id, plan.id, expires_at)
            .await
            .map_err(PaymentError::from)?;

        let subscription = self
            .subscription_service
            .create_for_plan(
                user_id,
                &plan,
                Some(PaymentRecord {
                    transaction_id: claim.payment_id.clone(),
                    payment_gateway: self.gateway.name().to_string(),
                    paid_on: now,
                    amount_paid: claim.amount,
                }),
            )
            .await?;

        tracing::info!(
            user_id = %user_id,
            plan = %plan.name,
            order_id = %claim.order_id,
            "Payment verified and plan activated"
        );

        Ok(PaymentVerified {
            api_key,
            subscription,
            expires_at,
        })
    }
}
