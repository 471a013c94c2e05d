use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use uuid::Uuid;

use docuchat_backend::domain::plan::{Plan, PlanName};
use docuchat_backend::domain::resource::{FileResource, ResourceKind, WebsiteUrl};
use docuchat_backend::domain::subscription::{Subscription, SubscriptionStatus};
use docuchat_backend::domain::user::{ApiKey, User};
use docuchat_backend::error::AppResult;
use docuchat_backend::infrastructure::repositories::{
    ApiKeyRepository, PaymentGateway, PlanRepository, ResourceRepository, RetrievalRepository,
    ScrapeRepository, StorageRepository, SubscriptionRepository, UserRepository,
};

/// In-memory subscription store. The mutex gives `try_deduct` the same
/// check-and-commit atomicity the SQL guard provides in production.
#[derive(Default)]
pub struct InMemorySubscriptionRepository {
    pub subscriptions: Mutex<Vec<Subscription>>,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: Uuid) -> Option<Subscription> {
        self.subscriptions
            .lock()
            .iter()
            .find(|s| s.id == id)
            .cloned()
    }

    pub fn all(&self) -> Vec<Subscription> {
        self.subscriptions.lock().clone()
    }

    pub fn seed(&self, subscription: Subscription) {
        self.subscriptions.lock().push(subscription);
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn insert(&self, subscription: &Subscription) -> AppResult<()> {
        self.subscriptions.lock().push(subscription.clone());
        Ok(())
    }

    async fn find_active(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
    ) -> AppResult<Option<Subscription>> {
        let subscriptions = self.subscriptions.lock();
        Ok(subscriptions
            .iter()
            .filter(|s| {
                s.user_id == user_id
                    && s.plan_id == plan_id
                    && s.status == SubscriptionStatus::Active
            })
            .max_by_key(|s| s.subscription_start)
            .cloned())
    }

    async fn find_active_for_user(&self, user_id: Uuid) -> AppResult<Option<Subscription>> {
        let subscriptions = self.subscriptions.lock();
        Ok(subscriptions
            .iter()
            .filter(|s| s.user_id == user_id && s.status == SubscriptionStatus::Active)
            .max_by_key(|s| s.subscription_start)
            .cloned())
    }

    async fn try_deduct(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        cost: i64,
    ) -> AppResult<Option<i64>> {
        let mut subscriptions = self.subscriptions.lock();
        let target = subscriptions
            .iter_mut()
            .filter(|s| {
                s.user_id == user_id
                    && s.plan_id == plan_id
                    && s.status == SubscriptionStatus::Active
            })
            .max_by_key(|s| s.subscription_start);

        match target {
            Some(subscription) if subscription.credits_used + cost <= subscription.total_credits => {
                subscription.credits_used += cost;
                subscription.updated_at = Utc::now();
                Ok(Some(subscription.total_credits - subscription.credits_used))
            }
            _ => Ok(None),
        }
    }

    async fn refund(&self, subscription_id: Uuid, amount: i64) -> AppResult<()> {
        let mut subscriptions = self.subscriptions.lock();
        if let Some(subscription) = subscriptions.iter_mut().find(|s| s.id == subscription_id) {
            subscription.credits_used = (subscription.credits_used - amount).max(0);
            subscription.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn expire_due(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut subscriptions = self.subscriptions.lock();
        let mut expired = 0;
        for subscription in subscriptions.iter_mut() {
            if subscription.status == SubscriptionStatus::Active && subscription.subscription_end < now
            {
                subscription.status = SubscriptionStatus::Expired;
                expired += 1;
            }
        }
        Ok(expired)
    }

    async fn cancel_active(&self, user_id: Uuid, plan_id: Uuid) -> AppResult<bool> {
        let mut subscriptions = self.subscriptions.lock();
        let target = subscriptions
            .iter_mut()
            .filter(|s| {
                s.user_id == user_id
                    && s.plan_id == plan_id
                    && s.status == SubscriptionStatus::Active
            })
            .max_by_key(|s| s.subscription_start);

        match target {
            Some(subscription) => {
                subscription.status = SubscriptionStatus::Cancelled;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// In-memory file/URL store with the same single-write activation
/// semantics as the SQL implementation.
#[derive(Default)]
pub struct InMemoryResourceRepository {
    pub files: Mutex<Vec<FileResource>>,
    pub urls: Mutex<Vec<WebsiteUrl>>,
}

impl InMemoryResourceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all_files(&self) -> Vec<FileResource> {
        self.files.lock().clone()
    }

    pub fn all_urls(&self) -> Vec<WebsiteUrl> {
        self.urls.lock().clone()
    }
}

#[async_trait]
impl ResourceRepository for InMemoryResourceRepository {
    async fn insert_file(&self, file: &FileResource) -> AppResult<()> {
        self.files.lock().push(file.clone());
        Ok(())
    }

    async fn insert_url(&self, url: &WebsiteUrl) -> AppResult<()> {
        self.urls.lock().push(url.clone());
        Ok(())
    }

    async fn list_files(&self, user_id: Uuid) -> AppResult<Vec<FileResource>> {
        Ok(self
            .files
            .lock()
            .iter()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_urls(&self, user_id: Uuid) -> AppResult<Vec<WebsiteUrl>> {
        Ok(self
            .urls
            .lock()
            .iter()
            .filter(|u| u.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_file(&self, user_id: Uuid, name: &str) -> AppResult<Option<FileResource>> {
        Ok(self
            .files
            .lock()
            .iter()
            .find(|f| f.user_id == user_id && f.name == name)
            .cloned())
    }

    async fn find_active_file(&self, user_id: Uuid) -> AppResult<Option<FileResource>> {
        Ok(self
            .files
            .lock()
            .iter()
            .find(|f| f.user_id == user_id && f.is_active)
            .cloned())
    }

    async fn find_active_url(&self, user_id: Uuid) -> AppResult<Option<WebsiteUrl>> {
        Ok(self
            .urls
            .lock()
            .iter()
            .find(|u| u.user_id == user_id && u.is_active)
            .cloned())
    }

    async fn set_active(
        &self,
        user_id: Uuid,
        kind: ResourceKind,
        identifier: &str,
    ) -> AppResult<bool> {
        match kind {
            ResourceKind::File => {
                let mut files = self.files.lock();
                if !files
                    .iter()
                    .any(|f| f.user_id == user_id && f.name == identifier)
                {
                    return Ok(false);
                }
                for file in files.iter_mut().filter(|f| f.user_id == user_id) {
                    file.is_active = file.name == identifier;
                }
                Ok(true)
            }
            ResourceKind::Url => {
                let mut urls = self.urls.lock();
                if !urls
                    .iter()
                    .any(|u| u.user_id == user_id && u.url == identifier)
                {
                    return Ok(false);
                }
                for url in urls.iter_mut().filter(|u| u.user_id == user_id) {
                    url.is_active = url.url == identifier;
                }
                Ok(true)
            }
        }
    }

    async fn remove(
        &self,
        user_id: Uuid,
        kind: ResourceKind,
        identifier: &str,
    ) -> AppResult<bool> {
        match kind {
            ResourceKind::File => {
                let mut files = self.files.lock();
                let before = files.len();
                files.retain(|f| !(f.user_id == user_id && f.name == identifier));
                Ok(files.len() < before)
            }
            ResourceKind::Url => {
                let mut urls = self.urls.lock();
                let before = urls.len();
                urls.retain(|u| !(u.user_id == user_id && u.url == identifier));
                Ok(urls.len() < before)
            }
        }
    }
}

#[derive(Default)]
pub struct InMemoryPlanRepository {
    pub plans: Mutex<Vec<Plan>>,
}

impl InMemoryPlanRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, plan: Plan) {
        self.plans.lock().push(plan);
    }
}

#[async_trait]
impl PlanRepository for InMemoryPlanRepository {
    async fn find_all(&self) -> AppResult<Vec<Plan>> {
        Ok(self.plans.lock().clone())
    }

    async fn find_by_id(&self, plan_id: Uuid) -> AppResult<Option<Plan>> {
        Ok(self.plans.lock().iter().find(|p| p.id == plan_id).cloned())
    }

    async fn find_by_name(&self, name: PlanName) -> AppResult<Option<Plan>> {
        Ok(self.plans.lock().iter().find(|p| p.name == name).cloned())
    }

    async fn insert(&self, plan: &Plan) -> AppResult<()> {
        self.plans.lock().push(plan.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    pub users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user_id: Uuid) -> Option<User> {
        self.users.lock().iter().find(|u| u.id == user_id).cloned()
    }

    pub fn seed(&self, user: User) {
        self.users.lock().push(user);
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, user_id: Uuid) -> AppResult<Option<User>> {
        Ok(self.get(user_id))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self.users.lock().iter().find(|u| u.email == email).cloned())
    }

    async fn create(&self, name: &str, email: &str, password_hash: &str) -> AppResult<User> {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: Some(password_hash.to_string()),
            oauth_provider: None,
            oauth_provider_id: None,
            profile_picture: None,
            active_plan_id: None,
            plan_expires_at: None,
            created_at: now,
            updated_at: now,
        };
        self.users.lock().push(user.clone());
        Ok(user)
    }

    async fn create_oauth(
        &self,
        name: &str,
        email: &str,
        provider: &str,
        provider_id: &str,
        profile_picture: Option<&str>,
    ) -> AppResult<User> {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: None,
            oauth_provider: Some(provider.to_string()),
            oauth_provider_id: Some(provider_id.to_string()),
            profile_picture: profile_picture.map(String::from),
            active_plan_id: None,
            plan_expires_at: None,
            created_at: now,
            updated_at: now,
        };
        self.users.lock().push(user.clone());
        Ok(user)
    }

    async fn set_active_plan(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut users = self.users.lock();
        if let Some(user) = users.iter_mut().find(|u| u.id == user_id) {
            user.active_plan_id = Some(plan_id);
            user.plan_expires_at = Some(expires_at);
            user.updated_at = Utc::now();
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryApiKeyRepository {
    pub keys: Mutex<Vec<ApiKey>>,
}

impl InMemoryApiKeyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<ApiKey> {
        self.keys.lock().clone()
    }
}

#[async_trait]
impl ApiKeyRepository for InMemoryApiKeyRepository {
    async fn insert(&self, api_key: &ApiKey) -> AppResult<()> {
        self.keys.lock().push(api_key.clone());
        Ok(())
    }

    async fn find_by_key(&self, key: &str) -> AppResult<Option<ApiKey>> {
        Ok(self.keys.lock().iter().find(|k| k.key == key).cloned())
    }

    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Vec<ApiKey>> {
        Ok(self
            .keys
            .lock()
            .iter()
            .filter(|k| k.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut keys = self.keys.lock();
        let before = keys.len();
        keys.retain(|k| k.expires_at >= now);
        Ok((before - keys.len()) as u64)
    }
}

/// Gateway fake with a deterministic signature scheme
pub struct FakePaymentGateway;

#[async_trait]
impl PaymentGateway for FakePaymentGateway {
    fn name(&self) -> &'static str {
        "fake-gateway"
    }

    async fn create_order(&self, amount: i64, currency: &str) -> Result<String, String> {
        Ok(format!("order_{}_{}", currency, amount))
    }

    fn expected_signature(&self, order_id: &str, payment_id: &str) -> String {
        format!("sig:{}|{}", order_id, payment_id)
    }
}

/// In-memory payload storage; `fail_stores` makes the next store call
/// fail so refund behavior can be exercised.
#[derive(Default)]
pub struct InMemoryStorageRepository {
    pub payloads: Mutex<HashMap<String, Vec<u8>>>,
    pub fail_stores: AtomicBool,
    counter: AtomicUsize,
}

impl InMemoryStorageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.payloads.lock().contains_key(key)
    }

    pub fn payload_count(&self) -> usize {
        self.payloads.lock().len()
    }

    pub fn drop_payload(&self, key: &str) {
        self.payloads.lock().remove(key);
    }
}

#[async_trait]
impl StorageRepository for InMemoryStorageRepository {
    async fn store(&self, name: &str, bytes: &[u8]) -> Result<String, String> {
        if self.fail_stores.load(Ordering::SeqCst) {
            return Err("storage is unavailable".to_string());
        }
        let key = format!("{}_{}", self.counter.fetch_add(1, Ordering::SeqCst), name);
        self.payloads.lock().insert(key.clone(), bytes.to_vec());
        Ok(key)
    }

    async fn load(&self, key: &str) -> Result<Vec<u8>, String> {
        self.payloads
            .lock()
            .get(key)
            .cloned()
            .ok_or_else(|| format!("payload {} not found", key))
    }

    async fn delete(&self, key: &str) -> Result<bool, String> {
        Ok(self.payloads.lock().remove(key).is_some())
    }
}

/// Retrieval fake that counts invocations; `fail` makes every call error
#[derive(Default)]
pub struct FakeRetrievalRepository {
    pub calls: AtomicUsize,
    pub fail: AtomicBool,
}

impl FakeRetrievalRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RetrievalRepository for FakeRetrievalRepository {
    async fn answer(&self, context: &str, question: &str) -> Result<String, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err("model is unavailable".to_string());
        }
        Ok(format!(
            "answer to '{}' from {} chars of context",
            question,
            context.len()
        ))
    }
}

pub struct FakeScrapeRepository {
    pub text: String,
}

impl FakeScrapeRepository {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

#[async_trait]
impl ScrapeRepository for FakeScrapeRepository {
    async fn fetch_text(&self, _url: &str) -> Result<String, String> {
        Ok(self.text.clone())
    }
}
