mod helpers;

use helpers::fakes::InMemorySubscriptionRepository;
use helpers::fixtures::{active_subscription, overdue_subscription, plan_with_credits};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use uuid::Uuid;

use docuchat_backend::domain::plan::PlanName;
use docuchat_backend::domain::subscription::{
    PaymentRecord, SubscriptionError, SubscriptionService, SubscriptionStatus,
};

#[tokio::test]
async fn it_should_copy_credits_from_the_plan_at_creation() {
    let repo = Arc::new(InMemorySubscriptionRepository::new());
    let service = SubscriptionService::new(repo.clone());
    let plan = plan_with_credits(PlanName::Pro, 500);
    let user_id = Uuid::new_v4();

    let subscription = service
        .create_for_plan(user_id, &plan, None)
        .await
        .unwrap();

    assert_eq!(subscription.total_credits, 500);
    assert_eq!(subscription.credits_used, 0);
    assert_eq!(subscription.status, SubscriptionStatus::Active);
    assert!(subscription.payment.is_none());
    assert!(subscription.subscription_end > subscription.subscription_start);
}

#[tokio::test]
async fn it_should_keep_subscription_history_as_separate_records() {
    let repo = Arc::new(InMemorySubscriptionRepository::new());
    let service = SubscriptionService::new(repo.clone());
    let user_id = Uuid::new_v4();

    let free = plan_with_credits(PlanName::Free, 50);
    let pro = plan_with_credits(PlanName::Pro, 500);

    let first = service.create_for_plan(user_id, &free, None).await.unwrap();
    let second = service
        .create_for_plan(
            user_id,
            &pro,
            Some(PaymentRecord {
                transaction_id: "pay_123".to_string(),
                payment_gateway: "fake-gateway".to_string(),
                paid_on: chrono::Utc::now(),
                amount_paid: 49900,
            }),
        )
        .await
        .unwrap();

    let all = repo.all();
    assert_eq!(all.len(), 2);
    assert_ne!(first.id, second.id);
    // The prior record is untouched
    let stored_first = repo.get(first.id).unwrap();
    assert_eq!(stored_first.total_credits, 50);
    assert_eq!(stored_first.plan_id, free.id);
}

#[tokio::test]
async fn it_should_expire_overdue_subscriptions_without_touching_credits() {
    let repo = Arc::new(InMemorySubscriptionRepository::new());
    let service = SubscriptionService::new(repo.clone());
    let user_id = Uuid::new_v4();
    let plan_id = Uuid::new_v4();

    let overdue = overdue_subscription(user_id, plan_id);
    let overdue_id = overdue.id;
    let used_before = overdue.credits_used;
    repo.seed(overdue);

    let current = active_subscription(Uuid::new_v4(), plan_id, 100, 0);
    let current_id = current.id;
    repo.seed(current);

    let expired = service.expire_due().await.unwrap();
    assert_eq!(expired, 1);

    let stored = repo.get(overdue_id).unwrap();
    assert_eq!(stored.status, SubscriptionStatus::Expired);
    assert_eq!(stored.credits_used, used_before);

    let untouched = repo.get(current_id).unwrap();
    assert_eq!(untouched.status, SubscriptionStatus::Active);
}

#[tokio::test]
async fn it_should_be_idempotent_when_the_sweep_runs_twice() {
    let repo = Arc::new(InMemorySubscriptionRepository::new());
    let service = SubscriptionService::new(repo.clone());
    repo.seed(overdue_subscription(Uuid::new_v4(), Uuid::new_v4()));
    repo.seed(overdue_subscription(Uuid::new_v4(), Uuid::new_v4()));

    let first = service.expire_due().await.unwrap();
    assert_eq!(first, 2);

    let second = service.expire_due().await.unwrap();
    assert_eq!(second, 0, "a rerun with nothing overdue is a no-op");

    let expired_count = repo
        .all()
        .iter()
        .filter(|s| s.status == SubscriptionStatus::Expired)
        .count();
    assert_eq!(expired_count, 2);
}

#[tokio::test]
async fn it_should_cancel_only_an_active_subscription() {
    let repo = Arc::new(InMemorySubscriptionRepository::new());
    let service = SubscriptionService::new(repo.clone());
    let (user_id, plan_id) = (Uuid::new_v4(), Uuid::new_v4());
    let subscription = active_subscription(user_id, plan_id, 10, 3);
    let subscription_id = subscription.id;
    repo.seed(subscription);

    service.cancel(user_id, plan_id).await.unwrap();
    let stored = repo.get(subscription_id).unwrap();
    assert_eq!(stored.status, SubscriptionStatus::Cancelled);

    // Cancelled is terminal: a second cancel finds nothing active
    let result = service.cancel(user_id, plan_id).await;
    assert!(matches!(
        result,
        Err(SubscriptionError::NoActiveSubscription)
    ));
}

#[tokio::test]
async fn it_should_not_deduct_from_an_expired_subscription() {
    let repo = Arc::new(InMemorySubscriptionRepository::new());
    let service = SubscriptionService::new(repo.clone());
    let (user_id, plan_id) = (Uuid::new_v4(), Uuid::new_v4());
    repo.seed(overdue_subscription(user_id, plan_id));

    service.expire_due().await.unwrap();

    let result = service.authorize_and_deduct(user_id, plan_id, 1).await;
    assert!(matches!(
        result,
        Err(SubscriptionError::NoActiveSubscription)
    ));
}

#[tokio::test]
async fn it_should_pick_the_most_recent_active_subscription() {
    let repo = Arc::new(InMemorySubscriptionRepository::new());
    let service = SubscriptionService::new(repo.clone());
    let user_id = Uuid::new_v4();

    let mut older = active_subscription(user_id, Uuid::new_v4(), 50, 10);
    older.subscription_start = chrono::Utc::now() - chrono::Duration::days(20);
    repo.seed(older);

    let newer = active_subscription(user_id, Uuid::new_v4(), 500, 0);
    let newer_id = newer.id;
    repo.seed(newer);

    let active = service.get_active(user_id).await.unwrap();
    assert_eq!(active.id, newer_id);
}
