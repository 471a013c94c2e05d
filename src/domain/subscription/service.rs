use super::error::SubscriptionError;
use super::model::{PaymentRecord, Subscription, SubscriptionStatus};
use crate::domain::plan::Plan;
use crate::infrastructure::repositories::SubscriptionRepository;
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Credit metering engine and subscription lifecycle.
///
/// Every credit-consuming action (file upload, URL upload, AI query) goes
/// through `authorize_and_deduct` - one primitive instead of a per-feature
/// copy of the check-then-write pattern.
pub struct SubscriptionService {
    subscription_repo: Arc<dyn SubscriptionRepository>,
}

impl SubscriptionService {
    pub fn new(subscription_repo: Arc<dyn SubscriptionRepository>) -> Self {
        Self { subscription_repo }
    }

    /// Authorize a credit-consuming action and record the consumption.
    ///
    /// The deduction is a single guarded update against the active
    /// subscription: it commits only when the resulting balance stays
    /// within `total_credits`. Returns the credits left after the
    /// deduction. The caller must perform its side effect only after this
    /// returns Ok - a rejected check must abort the whole action.
    pub async fn authorize_and_deduct(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        unit_cost: i64,
    ) -> Result<i64, SubscriptionError> {
        if unit_cost < 0 {
            return Err(SubscriptionError::Invalid(
                "credit cost cannot be negative".to_string(),
            ));
        }

        let committed = self
            .subscription_repo
            .try_deduct(user_id, plan_id, unit_cost)
            .await
            .map_err(|e| SubscriptionError::Dependency(e.to_string()))?;

        match committed {
            Some(credits_left) => {
                tracing::info!(
                    user_id = %user_id,
                    plan_id = %plan_id,
                    unit_cost,
                    credits_left,
                    "Credits deducted"
                );
                Ok(credits_left)
            }
            // The guard rejected: either no active subscription, or not
            // enough balance. One extra read classifies the failure.
            None => {
                let existing = self
                    .subscription_repo
                    .find_active(user_id, plan_id)
                    .await
                    .map_err(|e| SubscriptionError::Dependency(e.to_string()))?;

                match existing {
                    Some(_) => Err(SubscriptionError::InsufficientCredits),
                    None => Err(SubscriptionError::NoActiveSubscription),
                }
            }
        }
    }

    /// Refund a prior deduction. Only called when the downstream action
    /// failed after a successful `authorize_and_deduct` and the refund
    /// policy is enabled.
    pub async fn refund(
        &self,
        subscription_id: Uuid,
        unit_cost: i64,
    ) -> Result<(), SubscriptionError> {
        self.subscription_repo
            .refund(subscription_id, unit_cost)
            .await
            .map_err(|e| SubscriptionError::Dependency(e.to_string()))
    }

    /// Refund against the caller's active (user, plan) subscription
    pub async fn refund_active(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        unit_cost: i64,
    ) -> Result<(), SubscriptionError> {
        let subscription = self
            .subscription_repo
            .find_active(user_id, plan_id)
            .await
            .map_err(|e| SubscriptionError::Dependency(e.to_string()))?
            .ok_or(SubscriptionError::NoActiveSubscription)?;

        self.refund(subscription.id, unit_cost).await
    }

    /// Create a new subscription under the given plan.
    ///
    /// `total_credits` is copied from the plan here and never re-read. A
    /// prior subscription is left untouched - history is preserved as
    /// separate rows.
    pub async fn create_for_plan(
        &self,
        user_id: Uuid,
        plan: &Plan,
        payment: Option<PaymentRecord>,
    ) -> Result<Subscription, SubscriptionError> {
        let now = Utc::now();
        let subscription = Subscription {
            id: Uuid::new_v4(),
            user_id,
            plan_id: plan.id,
            subscription_start: now,
            subscription_end: now + Duration::days(plan.duration_days as i64),
            total_credits: plan.total_credits,
            credits_used: 0,
            status: SubscriptionStatus::Active,
            payment,
            created_at: now,
            updated_at: now,
        };

        self.subscription_repo
            .insert(&subscription)
            .await
            .map_err(|e| SubscriptionError::Dependency(e.to_string()))?;

        tracing::info!(
            user_id = %user_id,
            plan = %plan.name,
            subscription_id = %subscription.id,
            ends = %subscription.subscription_end,
            "Subscription created"
        );

        Ok(subscription)
    }

    /// Most recent active subscription for the user
    pub async fn get_active(&self, user_id: Uuid) -> Result<Subscription, SubscriptionError> {
        self.subscription_repo
            .find_active_for_user(user_id)
            .await
            .map_err(|e| SubscriptionError::Dependency(e.to_string()))?
            .ok_or(SubscriptionError::NoActiveSubscription)
    }

    /// Cancel the active subscription under the given plan. One-way:
    /// cancelled subscriptions never become active again.
    pub async fn cancel(&self, user_id: Uuid, plan_id: Uuid) -> Result<(), SubscriptionError> {
        let cancelled = self
            .subscription_repo
            .cancel_active(user_id, plan_id)
            .await
            .map_err(|e| SubscriptionError::Dependency(e.to_string()))?;

        if !cancelled {
            return Err(SubscriptionError::NoActiveSubscription);
        }
        Ok(())
    }

    /// Expiry sweep: flip every active subscription whose end has passed to
    /// expired. Idempotent - rerunning when nothing is overdue is a no-op.
    /// Does not touch `credits_used`.
    pub async fn expire_due(&self) -> Result<u64, SubscriptionError> {
        let expired = self
            .subscription_repo
            .expire_due(Utc::now())
            .await
            .map_err(|e| SubscriptionError::Dependency(e.to_string()))?;

        if expired > 0 {
            tracing::info!(expired, "Expiry sweep transitioned subscriptions");
        }
        Ok(expired)
    }
}
