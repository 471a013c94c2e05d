mod helpers;

use helpers::fakes::{
    FakePaymentGateway, InMemoryApiKeyRepository, InMemoryPlanRepository,
    InMemorySubscriptionRepository, InMemoryUserRepository,
};
use helpers::fixtures::{plan_with_credits, user};
use hmac::{Hmac, Mac};
use pretty_assertions::assert_eq;
use sha2::Sha256;
use std::sync::Arc;
use uuid::Uuid;

use docuchat_backend::domain::auth::ApiKeyManager;
use docuchat_backend::domain::payment::{PaymentClaim, PaymentError, PaymentService};
use docuchat_backend::domain::plan::{Plan, PlanName};
use docuchat_backend::domain::subscription::{SubscriptionService, SubscriptionStatus};
use docuchat_backend::infrastructure::repositories::{PaymentGateway, RazorpayGateway};

struct Setup {
    subscription_repo: Arc<InMemorySubscriptionRepository>,
    user_repo: Arc<InMemoryUserRepository>,
    api_key_repo: Arc<InMemoryApiKeyRepository>,
    service: PaymentService,
    plan: Plan,
    user_id: Uuid,
}

fn setup() -> Setup {
    let subscription_repo = Arc::new(InMemorySubscriptionRepository::new());
    let user_repo = Arc::new(InMemoryUserRepository::new());
    let api_key_repo = Arc::new(InMemoryApiKeyRepository::new());
    let plan_repo = Arc::new(InMemoryPlanRepository::new());

    let plan = plan_with_credits(PlanName::Pro, 500);
    plan_repo.seed(plan.clone());

    let account = user("buyer@example.com");
    let user_id = account.id;
    user_repo.seed(account);

    let subscription_service = Arc::new(SubscriptionService::new(subscription_repo.clone()));
    let service = PaymentService::new(
        Arc::new(FakePaymentGateway),
        plan_repo,
        user_repo.clone(),
        api_key_repo.clone(),
        subscription_service,
        ApiKeyManager::new("api-key-secret".to_string()),
    );

    Setup {
        subscription_repo,
        user_repo,
        api_key_repo,
        service,
        plan,
        user_id,
    }
}

fn valid_claim(plan_id: Uuid) -> PaymentClaim {
    PaymentClaim {
        order_id: "order_1".to_string(),
        payment_id: "pay_1".to_string(),
        signature: FakePaymentGateway.expected_signature("order_1", "pay_1"),
        plan_id,
        amount: 49900,
    }
}

#[tokio::test]
async fn it_should_activate_the_plan_on_a_valid_signature() {
    let s = setup();

    let verified = s
        .service
        .verify_and_activate(s.user_id, valid_claim(s.plan.id))
        .await
        .unwrap();

    // Subscription carries the payment record and the plan's credits
    assert_eq!(verified.subscription.total_credits, 500);
    assert_eq!(verified.subscription.credits_used, 0);
    assert_eq!(verified.subscription.status, SubscriptionStatus::Active);
    let payment = verified.subscription.payment.as_ref().unwrap();
    assert_eq!(payment.transaction_id, "pay_1");
    assert_eq!(payment.payment_gateway, "fake-gateway");
    assert_eq!(payment.amount_paid, 49900);

    // API key is persisted and verifiable
    let keys = s.api_key_repo.all();
    assert_eq!(keys.len(), 1);
    let claims = ApiKeyManager::new("api-key-secret".to_string())
        .verify(&keys[0].key)
        .unwrap();
    assert_eq!(claims.user_id().unwrap(), s.user_id);
    assert_eq!(claims.plan, "Pro");
    assert_eq!(claims.order_id, "order_1");

    // The user now points at the paid plan
    let stored_user = s.user_repo.get(s.user_id).unwrap();
    assert_eq!(stored_user.active_plan_id, Some(s.plan.id));
    assert!(stored_user.plan_expires_at.is_some());
}

#[tokio::test]
async fn it_should_reject_a_tampered_signature_without_creating_state() {
    let s = setup();

    let mut claim = valid_claim(s.plan.id);
    claim.signature.push('x');

    let result = s.service.verify_and_activate(s.user_id, claim).await;
    assert!(matches!(result, Err(PaymentError::VerificationFailed)));

    // No subscription, no API key, user untouched
    assert!(s.subscription_repo.all().is_empty());
    assert!(s.api_key_repo.all().is_empty());
    let stored_user = s.user_repo.get(s.user_id).unwrap();
    assert_eq!(stored_user.active_plan_id, None);
}

#[tokio::test]
async fn it_should_reject_a_signature_for_a_different_payment() {
    let s = setup();

    let mut claim = valid_claim(s.plan.id);
    // A signature valid for some other (order, payment) pair
    claim.signature = FakePaymentGateway.expected_signature("order_2", "pay_2");

    let result = s.service.verify_and_activate(s.user_id, claim).await;
    assert!(matches!(result, Err(PaymentError::VerificationFailed)));
    assert!(s.subscription_repo.all().is_empty());
}

#[tokio::test]
async fn it_should_require_all_claim_fields() {
    let s = setup();

    let mut claim = valid_claim(s.plan.id);
    claim.payment_id = String::new();

    let result = s.service.verify_and_activate(s.user_id, claim).await;
    assert!(matches!(result, Err(PaymentError::Invalid(_))));
    assert!(s.api_key_repo.all().is_empty());
}

#[tokio::test]
async fn it_should_fail_for_an_unknown_plan() {
    let s = setup();

    let claim = valid_claim(Uuid::new_v4());
    let result = s.service.verify_and_activate(s.user_id, claim).await;
    assert!(matches!(result, Err(PaymentError::PlanNotFound)));
    assert!(s.subscription_repo.all().is_empty());
}

#[tokio::test]
async fn it_should_validate_order_creation_input() {
    let s = setup();

    let result = s.service.create_order(0, "INR").await;
    assert!(matches!(result, Err(PaymentError::Invalid(_))));

    let result = s.service.create_order(49900, "").await;
    assert!(matches!(result, Err(PaymentError::Invalid(_))));

    let order_id = s.service.create_order(49900, "INR").await.unwrap();
    assert_eq!(order_id, "order_INR_49900");
}

#[test]
fn razorpay_signature_matches_a_reference_hmac() {
    let gateway = RazorpayGateway::new("key_id".to_string(), "s3cret".to_string());

    type HmacSha256 = Hmac<Sha256>;
    let mut mac = HmacSha256::new_from_slice(b"s3cret").unwrap();
    mac.update(b"order_abc|pay_xyz");
    let reference = hex::encode(mac.finalize().into_bytes());

    assert_eq!(gateway.expected_signature("order_abc", "pay_xyz"), reference);
}
