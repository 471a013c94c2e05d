use chrono::{Duration, Utc};
use uuid::Uuid;

use docuchat_backend::domain::plan::{Feature, FeatureKind, Plan, PlanName};
use docuchat_backend::domain::subscription::{Subscription, SubscriptionStatus};
use docuchat_backend::domain::user::User;

/// A plan with the given credit allotment and one feature per kind.
/// Costs: ai_message = 1, file_upload = 4, url_upload = 2.
pub fn plan_with_credits(name: PlanName, total_credits: i64) -> Plan {
    let now = Utc::now();
    Plan {
        id: Uuid::new_v4(),
        name,
        price: 49900,
        duration_days: 30,
        total_credits,
        is_active: true,
        features: vec![
            Feature {
                name: FeatureKind::AiMessage,
                per_unit_credit_cost: 1,
                max_units_allowed: total_credits,
                allocated_credits: total_credits,
            },
            Feature {
                name: FeatureKind::FileUpload,
                per_unit_credit_cost: 4,
                max_units_allowed: total_credits / 4,
                allocated_credits: total_credits,
            },
            Feature {
                name: FeatureKind::UrlUpload,
                per_unit_credit_cost: 2,
                max_units_allowed: total_credits / 2,
                allocated_credits: total_credits,
            },
        ],
        created_at: now,
        updated_at: now,
    }
}

/// An active subscription with the given balance
pub fn active_subscription(
    user_id: Uuid,
    plan_id: Uuid,
    total_credits: i64,
    credits_used: i64,
) -> Subscription {
    let now = Utc::now();
    Subscription {
        id: Uuid::new_v4(),
        user_id,
        plan_id,
        subscription_start: now,
        subscription_end: now + Duration::days(30),
        total_credits,
        credits_used,
        status: SubscriptionStatus::Active,
        payment: None,
        created_at: now,
        updated_at: now,
    }
}

/// An active subscription whose end already passed
pub fn overdue_subscription(user_id: Uuid, plan_id: Uuid) -> Subscription {
    let now = Utc::now();
    Subscription {
        id: Uuid::new_v4(),
        user_id,
        plan_id,
        subscription_start: now - Duration::days(40),
        subscription_end: now - Duration::days(10),
        total_credits: 100,
        credits_used: 37,
        status: SubscriptionStatus::Active,
        payment: None,
        created_at: now - Duration::days(40),
        updated_at: now - Duration::days(40),
    }
}

pub fn user(email: &str) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        name: "Test User".to_string(),
        email: email.to_string(),
        password_hash: None,
        oauth_provider: Some("google".to_string()),
        oauth_provider_id: Some(format!("provider_{}", Uuid::new_v4())),
        profile_picture: None,
        active_plan_id: None,
        plan_expires_at: None,
        created_at: now,
        updated_at: now,
    }
}
