pub mod api_key_repository;
pub mod local_storage_repository;
pub mod openai_retrieval_repository;
pub mod payment_gateway;
pub mod plan_repository;
pub mod razorpay_gateway;
pub mod resource_repository;
pub mod retrieval_repository;
pub mod scrape_repository;
pub mod storage_repository;
pub mod subscription_repository;
pub mod user_repository;

pub use api_key_repository::{ApiKeyRepository, PgApiKeyRepository};
pub use local_storage_repository::LocalStorageRepository;
pub use openai_retrieval_repository::OpenAiRetrievalRepository;
pub use payment_gateway::PaymentGateway;
pub use plan_repository::{PgPlanRepository, PlanRepository};
pub use razorpay_gateway::RazorpayGateway;
pub use resource_repository::{PgResourceRepository, ResourceRepository};
pub use retrieval_repository::RetrievalRepository;
pub use scrape_repository::{HttpScrapeRepository, ScrapeRepository};
pub use storage_repository::StorageRepository;
pub use subscription_repository::{PgSubscriptionRepository, SubscriptionRepository};
pub use user_repository::{PgUserRepository, UserRepository};
