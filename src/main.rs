use async_openai::config::OpenAIConfig;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docuchat_backend::domain::auth::{ApiKeyManager, AuthService, JwtManager};
use docuchat_backend::domain::chat::ChatService;
use docuchat_backend::domain::payment::PaymentService;
use docuchat_backend::domain::plan::PlanService;
use docuchat_backend::domain::resource::ResourceService;
use docuchat_backend::domain::subscription::SubscriptionService;
use docuchat_backend::domain::user::UserService;
use docuchat_backend::infrastructure::config::{Config, LogFormat};
use docuchat_backend::infrastructure::db::{check_connection, create_pool, run_migrations};
use docuchat_backend::infrastructure::http::start_http_server;
use docuchat_backend::infrastructure::oauth::GoogleOAuthClient;
use docuchat_backend::infrastructure::repositories::{
    ApiKeyRepository, HttpScrapeRepository, LocalStorageRepository, OpenAiRetrievalRepository,
    PgApiKeyRepository, PgPlanRepository, PgResourceRepository, PgSubscriptionRepository,
    PgUserRepository, PlanRepository, RazorpayGateway, ResourceRepository, SubscriptionRepository,
    UserRepository,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        "Starting DocuChat Backend on {}:{}",
        config.host,
        config.port
    );

    // Create database connection pool
    let pool = create_pool(&config.database_url).await?;
    tracing::info!("Database connection pool created");

    // Verify database connection and apply migrations
    check_connection(&pool).await?;
    run_migrations(&pool).await?;
    tracing::info!("Database connection verified");

    let pool = Arc::new(pool);
    let config = Arc::new(config);

    // OpenAI client shared by the retrieval pipeline
    let openai_client = Arc::new(async_openai::Client::with_config(
        OpenAIConfig::new().with_api_key(config.openai_api_key.clone()),
    ));

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Instantiate repositories (inject db pool)
    tracing::info!("Instantiating repositories...");
    let user_repo: Arc<dyn UserRepository> = Arc::new(PgUserRepository::new(pool.clone()));
    let plan_repo: Arc<dyn PlanRepository> = Arc::new(PgPlanRepository::new(pool.clone()));
    let subscription_repo: Arc<dyn SubscriptionRepository> =
        Arc::new(PgSubscriptionRepository::new(pool.clone()));
    let resource_repo: Arc<dyn ResourceRepository> =
        Arc::new(PgResourceRepository::new(pool.clone()));
    let api_key_repo: Arc<dyn ApiKeyRepository> = Arc::new(PgApiKeyRepository::new(pool.clone()));

    // 2. Instantiate external collaborators
    tracing::info!("Instantiating external collaborators...");
    let storage_repo = Arc::new(LocalStorageRepository::new(config.uploads_dir.clone()));
    let scrape_repo = Arc::new(HttpScrapeRepository::new());
    let retrieval_repo = Arc::new(OpenAiRetrievalRepository::new(
        openai_client,
        config.pinecone_api_key.clone(),
        config.pinecone_index_host.clone(),
    ));
    let payment_gateway = Arc::new(RazorpayGateway::new(
        config.razorpay_key_id.clone(),
        config.razorpay_key_secret.clone(),
    ));
    let google_oauth_client = Arc::new(GoogleOAuthClient::new(
        config.google_client_id.clone(),
        config.google_client_secret.clone(),
        config.google_redirect_uri.clone(),
    ));

    // 3. Instantiate services (inject repositories and collaborators)
    tracing::info!("Instantiating services...");
    let subscription_service = Arc::new(SubscriptionService::new(subscription_repo.clone()));
    let auth_service = Arc::new(AuthService::new(
        user_repo.clone(),
        plan_repo.clone(),
        subscription_service.clone(),
        JwtManager::new(config.jwt_secret.clone(), config.jwt_expiration_hours),
    ));
    let user_service = Arc::new(UserService::new(
        user_repo.clone(),
        plan_repo.clone(),
        subscription_repo.clone(),
    ));
    let plan_service = Arc::new(PlanService::new(plan_repo.clone(), user_repo.clone()));
    let resource_service = Arc::new(ResourceService::new(
        resource_repo.clone(),
        storage_repo.clone(),
        plan_repo.clone(),
        subscription_service.clone(),
        config.refund_on_failure,
    ));
    let chat_service = Arc::new(ChatService::new(
        resource_repo.clone(),
        storage_repo.clone(),
        scrape_repo.clone(),
        retrieval_repo.clone(),
        plan_repo.clone(),
        subscription_service.clone(),
        config.answer_cache_enabled,
        config.refund_on_failure,
    ));
    let payment_service = Arc::new(PaymentService::new(
        payment_gateway,
        plan_repo.clone(),
        user_repo.clone(),
        api_key_repo.clone(),
        subscription_service.clone(),
        ApiKeyManager::new(config.api_key_secret.clone()),
    ));

    // 4. Instantiate controllers (inject services)
    tracing::info!("Instantiating controllers...");
    let auth_controller = Arc::new(docuchat_backend::controllers::auth::AuthController::new(
        auth_service.clone(),
    ));
    let oauth_controller = Arc::new(docuchat_backend::controllers::oauth::OAuthController::new(
        google_oauth_client,
        auth_service,
    ));
    let user_controller = Arc::new(docuchat_backend::controllers::user::UserController::new(
        user_service,
    ));
    let plan_controller = Arc::new(docuchat_backend::controllers::plan::PlanController::new(
        plan_service,
    ));
    let subscription_controller = Arc::new(
        docuchat_backend::controllers::subscription::SubscriptionController::new(
            subscription_service.clone(),
            api_key_repo.clone(),
        ),
    );
    let payment_controller = Arc::new(
        docuchat_backend::controllers::payment::PaymentController::new(payment_service),
    );
    let resource_controller = Arc::new(
        docuchat_backend::controllers::resource::ResourceController::new(resource_service),
    );
    let chat_controller = Arc::new(docuchat_backend::controllers::chat::ChatController::new(
        chat_service,
        plan_repo.clone(),
    ));
    let api_key_controller = Arc::new(
        docuchat_backend::controllers::api_key::ApiKeyController::new(
            api_key_repo.clone(),
            ApiKeyManager::new(config.api_key_secret.clone()),
        ),
    );

    // Start HTTP server with all routes
    start_http_server(
        pool,
        config,
        user_repo,
        api_key_repo,
        auth_controller,
        oauth_controller,
        user_controller,
        plan_controller,
        subscription_controller,
        payment_controller,
        resource_controller,
        chat_controller,
        api_key_controller,
    )
    .await?;

    Ok(())
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "docuchat_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "docuchat_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
