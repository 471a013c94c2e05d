mod helpers;

use helpers::fakes::{
    InMemoryPlanRepository, InMemorySubscriptionRepository, InMemoryUserRepository,
};
use helpers::fixtures::plan_with_credits;
use pretty_assertions::assert_eq;
use std::sync::Arc;

use docuchat_backend::domain::auth::{
    ApiKeyManager, AuthService, JwtManager, SignupRequest,
};
use docuchat_backend::domain::plan::PlanName;
use docuchat_backend::domain::subscription::{SubscriptionService, SubscriptionStatus};
use docuchat_backend::error::AppError;

struct Setup {
    user_repo: Arc<InMemoryUserRepository>,
    subscription_repo: Arc<InMemorySubscriptionRepository>,
    service: AuthService,
}

fn setup() -> Setup {
    let user_repo = Arc::new(InMemoryUserRepository::new());
    let subscription_repo = Arc::new(InMemorySubscriptionRepository::new());
    let plan_repo = Arc::new(InMemoryPlanRepository::new());
    plan_repo.seed(plan_with_credits(PlanName::Free, 50));

    let subscription_service = Arc::new(SubscriptionService::new(subscription_repo.clone()));
    let service = AuthService::new(
        user_repo.clone(),
        plan_repo,
        subscription_service,
        JwtManager::new("jwt-secret".to_string(), 24),
    );

    Setup {
        user_repo,
        subscription_repo,
        service,
    }
}

fn signup_request(email: &str) -> SignupRequest {
    SignupRequest {
        name: "Asha".to_string(),
        email: email.to_string(),
        password: "correct horse battery".to_string(),
    }
}

#[tokio::test]
async fn it_should_create_a_user_on_the_free_plan_at_signup() {
    let s = setup();

    let response = s.service.signup(signup_request("asha@example.com")).await.unwrap();
    assert_eq!(response.email, "asha@example.com");

    // A free subscription exists and the user points at the plan
    let subscriptions = s.subscription_repo.all();
    assert_eq!(subscriptions.len(), 1);
    assert_eq!(subscriptions[0].total_credits, 50);
    assert_eq!(subscriptions[0].status, SubscriptionStatus::Active);

    let user = s.user_repo.get(response.id).unwrap();
    assert!(user.active_plan_id.is_some());
    assert!(user.plan_expires_at.is_some());
    // The stored hash is never the raw password
    assert_ne!(user.password_hash.as_deref(), Some("correct horse battery"));
}

#[tokio::test]
async fn it_should_reject_a_short_password() {
    let s = setup();

    let mut request = signup_request("asha@example.com");
    request.password = "short".to_string();

    let result = s.service.signup(request).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));
    assert!(s.subscription_repo.all().is_empty());
}

#[tokio::test]
async fn it_should_reject_a_duplicate_email() {
    let s = setup();

    s.service.signup(signup_request("asha@example.com")).await.unwrap();
    let result = s.service.signup(signup_request("asha@example.com")).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn it_should_issue_a_verifiable_token_at_login() {
    let s = setup();
    s.service.signup(signup_request("asha@example.com")).await.unwrap();

    let response = s
        .service
        .login("asha@example.com", "correct horse battery")
        .await
        .unwrap();

    let manager = JwtManager::new("jwt-secret".to_string(), 24);
    let claims = manager.validate_token(&response.tokens.token).unwrap();
    assert_eq!(claims.email, "asha@example.com");
    assert_eq!(response.tokens.expires_in, 24 * 3600);
}

#[tokio::test]
async fn it_should_reject_a_wrong_password() {
    let s = setup();
    s.service.signup(signup_request("asha@example.com")).await.unwrap();

    let result = s.service.login("asha@example.com", "wrong password!").await;
    assert!(matches!(result, Err(AppError::Unauthorized(_))));
}

#[tokio::test]
async fn it_should_reject_password_login_for_an_oauth_account() {
    let s = setup();
    s.service
        .oauth_login("google", "g-1", "Asha", "asha@example.com", None)
        .await
        .unwrap();

    let result = s.service.login("asha@example.com", "any password 123").await;
    assert!(matches!(result, Err(AppError::Unauthorized(_))));
}

#[tokio::test]
async fn it_should_create_the_user_once_across_oauth_logins() {
    let s = setup();

    let first = s
        .service
        .oauth_login("google", "g-1", "Asha", "asha@example.com", Some("pic.png"))
        .await
        .unwrap();
    let second = s
        .service
        .oauth_login("google", "g-1", "Asha", "asha@example.com", Some("pic.png"))
        .await
        .unwrap();

    assert_eq!(first.user.id, second.user.id);
    // Only the first login creates a subscription
    assert_eq!(s.subscription_repo.all().len(), 1);
}

#[test]
fn api_key_claims_round_trip() {
    let manager = ApiKeyManager::new("api-key-secret".to_string());
    let user_id = uuid::Uuid::new_v4();
    let expires_at = chrono::Utc::now() + chrono::Duration::days(30);

    let key = manager.issue(user_id, "Pro", "order_1", expires_at).unwrap();
    let claims = manager.verify(&key).unwrap();

    assert_eq!(claims.user_id().unwrap(), user_id);
    assert_eq!(claims.plan, "Pro");
    assert_eq!(claims.order_id, "order_1");
}

#[test]
fn api_key_verification_rejects_a_different_secret() {
    let manager = ApiKeyManager::new("api-key-secret".to_string());
    let key = manager
        .issue(
            uuid::Uuid::new_v4(),
            "Pro",
            "order_1",
            chrono::Utc::now() + chrono::Duration::days(30),
        )
        .unwrap();

    let other = ApiKeyManager::new("another-secret".to_string());
    assert!(other.verify(&key).is_err());
}

#[test]
fn api_key_verification_rejects_an_expired_key() {
    let manager = ApiKeyManager::new("api-key-secret".to_string());
    let key = manager
        .issue(
            uuid::Uuid::new_v4(),
            "Pro",
            "order_1",
            chrono::Utc::now() - chrono::Duration::hours(2),
        )
        .unwrap();

    assert!(manager.verify(&key).is_err());
}
