use crate::domain::subscription::{PaymentRecord, Subscription, SubscriptionStatus};
use crate::error::AppResult;
use crate::infrastructure::db::DbPool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::sync::Arc;
use uuid::Uuid;

/// Persistence boundary for the subscription ledger.
///
/// `try_deduct` is the metering primitive: the balance check and the
/// increment must land in one atomic update so that two concurrent calls
/// can never both pass the check when only one unit of credit remains.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn insert(&self, subscription: &Subscription) -> AppResult<()>;

    /// Most recently started active subscription for (user, plan)
    async fn find_active(&self, user_id: Uuid, plan_id: Uuid)
        -> AppResult<Option<Subscription>>;

    /// Most recently started active subscription for the user, any plan
    async fn find_active_for_user(&self, user_id: Uuid) -> AppResult<Option<Subscription>>;

    /// Guarded deduction against the active (user, plan) subscription.
    ///
    /// Returns `Some(credits_left)` when the guard passed and the deduction
    /// was committed, `None` when no row satisfied the guard - either no
    /// active subscription exists or the balance would go negative. The
    /// caller distinguishes the two cases.
    async fn try_deduct(&self, user_id: Uuid, plan_id: Uuid, cost: i64)
        -> AppResult<Option<i64>>;

    /// Compensating decrement, clamped at zero
    async fn refund(&self, subscription_id: Uuid, amount: i64) -> AppResult<()>;

    /// Flip every overdue active subscription to expired; returns the count
    async fn expire_due(&self, now: DateTime<Utc>) -> AppResult<u64>;

    /// Cancel the active (user, plan) subscription; false when none exists
    async fn cancel_active(&self, user_id: Uuid, plan_id: Uuid) -> AppResult<bool>;
}

#[derive(Debug, FromRow)]
struct SubscriptionRow {
    id: Uuid,
    user_id: Uuid,
    plan_id: Uuid,
    subscription_start: DateTime<Utc>,
    subscription_end: DateTime<Utc>,
    total_credits: i64,
    credits_used: i64,
    status: SubscriptionStatus,
    transaction_id: Option<String>,
    payment_gateway: Option<String>,
    paid_on: Option<DateTime<Utc>>,
    amount_paid: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SubscriptionRow> for Subscription {
    fn from(row: SubscriptionRow) -> Self {
        let payment = match (row.transaction_id, row.payment_gateway, row.paid_on) {
            (Some(transaction_id), Some(payment_gateway), Some(paid_on)) => Some(PaymentRecord {
                transaction_id,
                payment_gateway,
                paid_on,
                amount_paid: row.amount_paid.unwrap_or(0),
            }),
            _ => None,
        };

        Subscription {
            id: row.id,
            user_id: row.user_id,
            plan_id: row.plan_id,
            subscription_start: row.subscription_start,
            subscription_end: row.subscription_end,
            total_credits: row.total_credits,
            credits_used: row.credits_used,
            status: row.status,
            payment,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub struct PgSubscriptionRepository {
    pool: Arc<DbPool>,
}

impl PgSubscriptionRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionRepository for PgSubscriptionRepository {
    async fn insert(&self, subscription: &Subscription) -> AppResult<()> {
        let pool = self.pool.as_ref();
        sqlx::query(
            r#"
            INSERT INTO subscriptions (
                id, user_id, plan_id, subscription_start, subscription_end,
                total_credits, credits_used, status,
                transaction_id, payment_gateway, paid_on, amount_paid,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(subscription.id)
        .bind(subscription.user_id)
        .bind(subscription.plan_id)
        .bind(subscription.subscription_start)
        .bind(subscription.subscription_end)
        .bind(subscription.total_credits)
        .bind(subscription.credits_used)
        .bind(subscription.status.to_string())
        .bind(subscription.payment.as_ref().map(|p| p.transaction_id.clone()))
        .bind(subscription.payment.as_ref().map(|p| p.payment_gateway.clone()))
        .bind(subscription.payment.as_ref().map(|p| p.paid_on))
        .bind(subscription.payment.as_ref().map(|p| p.amount_paid))
        .bind(subscription.created_at)
        .bind(subscription.updated_at)
        .execute(pool)
        .await?;

        Ok(())
    }

    async fn find_active(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
    ) -> AppResult<Option<Subscription>> {
        let pool = self.pool.as_ref();
        let row = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            SELECT * FROM subscriptions
            WHERE user_id = $1 AND plan_id = $2 AND status = 'active'
            ORDER BY subscription_start DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(plan_id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(Subscription::from))
    }

    async fn find_active_for_user(&self, user_id: Uuid) -> AppResult<Option<Subscription>> {
        let pool = self.pool.as_ref();
        let row = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            SELECT * FROM subscriptions
            WHERE user_id = $1 AND status = 'active'
            ORDER BY subscription_start DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(Subscription::from))
    }

    async fn try_deduct(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        cost: i64,
    ) -> AppResult<Option<i64>> {
        let pool = self.pool.as_ref();
        let remaining = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE subscriptions
            SET credits_used = credits_used + $3, updated_at = $4
            WHERE id = (
                SELECT id FROM subscriptions
                WHERE user_id = $1 AND plan_id = $2 AND status = 'active'
                ORDER BY subscription_start DESC
                LIMIT 1
            )
            AND credits_used + $3 <= total_credits
            RETURNING total_credits - credits_used
            "#,
        )
        .bind(user_id)
        .bind(plan_id)
        .bind(cost)
        .bind(Utc::now())
        .fetch_optional(pool)
        .await?;

        Ok(remaining)
    }

    async fn refund(&self, subscription_id: Uuid, amount: i64) -> AppResult<()> {
        let pool = self.pool.as_ref();
        sqlx::query(
            r#"
            UPDATE subscriptions
            SET credits_used = GREATEST(credits_used - $2, 0), updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(subscription_id)
        .bind(amount)
        .bind(Utc::now())
        .execute(pool)
        .await?;

        Ok(())
    }

    async fn expire_due(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let pool = self.pool.as_ref();
        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET status = 'expired', updated_at = $1
            WHERE status = 'active' AND subscription_end < $1
            "#,
        )
        .bind(now)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn cancel_active(&self, user_id: Uuid, plan_id: Uuid) -> AppResult<bool> {
        let pool = self.pool.as_ref();
        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET status = 'cancelled', updated_at = $3
            WHERE user_id = $1 AND plan_id = $2 AND status = 'active'
            "#,
        )
        .bind(user_id)
        .bind(plan_id)
        .bind(Utc::now())
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
