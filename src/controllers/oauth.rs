use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::auth::AuthService,
    error::{AppError, AppResult},
    infrastructure::oauth::GoogleOAuthClient,
};

#[derive(Debug, Deserialize)]
pub struct OAuthCallbackParams {
    pub code: String,
    #[allow(dead_code)]
    pub state: Option<String>,
}

pub struct OAuthController {
    google_client: Arc<GoogleOAuthClient>,
    auth_service: Arc<AuthService>,
}

impl OAuthController {
    pub fn new(google_client: Arc<GoogleOAuthClient>, auth_service: Arc<AuthService>) -> Self {
        Self {
            google_client,
            auth_service,
        }
    }

    /// GET /auth/oauth/google - Initiate Google OAuth flow
    pub async fn initiate_google(
        State(controller): State<Arc<OAuthController>>,
    ) -> impl IntoResponse {
        // Random state for CSRF protection
        let state = Uuid::new_v4().to_string();
        let auth_url = controller.google_client.get_authorization_url(&state);

        Redirect::temporary(&auth_url)
    }

    /// GET /auth/callback/google - Handle Google OAuth callback
    pub async fn google_callback(
        State(controller): State<Arc<OAuthController>>,
        Query(params): Query<OAuthCallbackParams>,
    ) -> AppResult<Response> {
        // Exchange code for access token
        let token_response = controller.google_client.exchange_code(&params.code).await?;

        // Get user info from Google
        let google_user = controller
            .google_client
            .get_user_info(&token_response.access_token)
            .await?;

        if google_user.email.is_empty() {
            return Err(AppError::BadRequest(
                "Google account has no email address".to_string(),
            ));
        }

        let name = google_user
            .name
            .clone()
            .unwrap_or_else(|| google_user.email.clone());

        let response = controller
            .auth_service
            .oauth_login(
                "google",
                &google_user.id,
                &name,
                &google_user.email,
                google_user.picture.as_deref(),
            )
            .await?;

        Ok(Json(response).into_response())
    }
}
