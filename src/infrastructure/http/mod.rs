use axum::{extract::DefaultBodyLimit, middleware, routing::get, routing::post, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::infrastructure::config::Config;
use crate::infrastructure::db::DbPool;
use crate::{
    controllers::{
        api_key::ApiKeyController, auth::AuthController, chat::ChatController, health,
        oauth::OAuthController, payment::PaymentController, plan::PlanController,
        resource::ResourceController, subscription::SubscriptionController,
        user::UserController,
    },
    infrastructure::auth::{api_key_middleware, auth_middleware, request_id_middleware},
};

use crate::infrastructure::repositories::{ApiKeyRepository, UserRepository};

/// Start the HTTP server with all routes configured
#[allow(clippy::too_many_arguments)]
pub async fn start_http_server(
    pool: Arc<DbPool>,
    config: Arc<Config>,
    user_repo: Arc<dyn UserRepository>,
    api_key_repo: Arc<dyn ApiKeyRepository>,
    auth_controller: Arc<AuthController>,
    oauth_controller: Arc<OAuthController>,
    user_controller: Arc<UserController>,
    plan_controller: Arc<PlanController>,
    subscription_controller: Arc<SubscriptionController>,
    payment_controller: Arc<PaymentController>,
    resource_controller: Arc<ResourceController>,
    chat_controller: Arc<ChatController>,
    api_key_controller: Arc<ApiKeyController>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Auth routes (public - no auth required)
    let auth_routes = Router::new()
        .route("/auth/signup", post(AuthController::signup))
        .route("/auth/login", post(AuthController::login))
        .route("/auth/logout", post(AuthController::logout))
        .with_state(auth_controller.clone());

    // OAuth routes (public - no auth required)
    let oauth_routes = Router::new()
        .route("/auth/oauth/google", get(OAuthController::initiate_google))
        .route("/auth/callback/google", get(OAuthController::google_callback))
        .with_state(oauth_controller.clone());

    // User routes (require authentication)
    let user_routes = Router::new()
        .route("/api/me", get(UserController::get_me))
        .with_state(user_controller.clone())
        .layer(middleware::from_fn_with_state(
            (user_repo.clone(), config.clone()),
            auth_middleware,
        ));

    // Plan routes: the catalog is public, "my plan" requires auth
    let plan_catalog_routes = Router::new()
        .route("/api/plans", get(PlanController::list_plans))
        .route("/api/plans/:planId", get(PlanController::get_plan))
        .with_state(plan_controller.clone());

    let plan_me_routes = Router::new()
        .route("/api/plans/me", get(PlanController::get_my_plan))
        .with_state(plan_controller.clone())
        .layer(middleware::from_fn_with_state(
            (user_repo.clone(), config.clone()),
            auth_middleware,
        ));

    // Subscription routes (require authentication)
    let subscription_routes = Router::new()
        .route("/api/subscription", get(SubscriptionController::get_subscription))
        .route("/api/subscription/cancel", post(SubscriptionController::cancel))
        .with_state(subscription_controller.clone())
        .layer(middleware::from_fn_with_state(
            (user_repo.clone(), config.clone()),
            auth_middleware,
        ));

    // Expiry sweep: externally triggered, not part of the public API
    let sweep_routes = Router::new()
        .route(
            "/internal/subscriptions/sweep",
            post(SubscriptionController::sweep),
        )
        .with_state(subscription_controller.clone());

    // Payment routes (require authentication)
    let payment_routes = Router::new()
        .route("/api/payment/order", post(PaymentController::create_order))
        .route("/api/payment/verify", post(PaymentController::verify_order))
        .with_state(payment_controller.clone())
        .layer(middleware::from_fn_with_state(
            (user_repo.clone(), config.clone()),
            auth_middleware,
        ));

    // File and URL routes (require authentication)
    let resource_routes = Router::new()
        .route(
            "/api/files",
            get(ResourceController::list_files).post(ResourceController::upload_file),
        )
        .route(
            "/api/files/:name/activate",
            post(ResourceController::activate_file),
        )
        .route(
            "/api/files/:name",
            axum::routing::delete(ResourceController::delete_file),
        )
        .route(
            "/api/urls",
            get(ResourceController::list_urls)
                .post(ResourceController::add_url)
                .delete(ResourceController::delete_url),
        )
        .route("/api/urls/activate", post(ResourceController::activate_url))
        .with_state(resource_controller.clone())
        // Uploads are capped at 10 MB in the controller; leave headroom
        // for the multipart framing
        .layer(DefaultBodyLimit::max(12 * 1024 * 1024))
        .layer(middleware::from_fn_with_state(
            (user_repo.clone(), config.clone()),
            auth_middleware,
        ));

    // Chat route (requires an API key)
    let chat_routes = Router::new()
        .route("/v1/chat/ask", post(ChatController::ask))
        .with_state(chat_controller.clone())
        .layer(middleware::from_fn_with_state(
            (api_key_repo.clone(), config.clone()),
            api_key_middleware,
        ));

    // API key routes: verification is public, listing requires auth
    let key_verify_routes = Router::new()
        .route("/api/keys/verify", post(ApiKeyController::verify_key))
        .with_state(api_key_controller.clone());

    let key_list_routes = Router::new()
        .route("/api/keys", get(ApiKeyController::list_keys))
        .with_state(api_key_controller.clone())
        .layer(middleware::from_fn_with_state(
            (user_repo.clone(), config.clone()),
            auth_middleware,
        ));

    // Build application routes
    let app = Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(pool.clone())
        .merge(auth_routes)
        .merge(oauth_routes)
        .merge(user_routes)
        .merge(plan_catalog_routes)
        .merge(plan_me_routes)
        .merge(subscription_routes)
        .merge(sweep_routes)
        .merge(payment_routes)
        .merge(resource_routes)
        .merge(chat_routes)
        .merge(key_verify_routes)
        .merge(key_list_routes)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http());

    // Start server
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
