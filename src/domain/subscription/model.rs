use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::Type, PartialEq)]
#[sqlx(type_name = "text")]
#[sqlx(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    #[serde(rename = "active")]
    Active,
    #[serde(rename = "expired")]
    Expired,
    #[serde(rename = "cancelled")]
    Cancelled,
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubscriptionStatus::Active => write!(f, "active"),
            SubscriptionStatus::Expired => write!(f, "expired"),
            SubscriptionStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Payment details attached to a subscription created through the gateway.
/// Free-tier subscriptions carry none.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub transaction_id: String,
    pub payment_gateway: String,
    pub paid_on: DateTime<Utc>,
    pub amount_paid: i64,
}

/// A time-bounded grant of credits under a plan, owned by a user.
///
/// `total_credits` is copied from the plan at creation time and never
/// re-read live. `credits_used` is the only field mutated after creation,
/// and only through the metering engine or the expiry sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub subscription_start: DateTime<Utc>,
    pub subscription_end: DateTime<Utc>,
    pub total_credits: i64,
    pub credits_used: i64,
    pub status: SubscriptionStatus,
    pub payment: Option<PaymentRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    pub fn credits_left(&self) -> i64 {
        (self.total_credits - self.credits_used).max(0)
    }

    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }
}
