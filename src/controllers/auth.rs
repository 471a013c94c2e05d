use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::{
    domain::auth::{AuthService, LoginRequest, LoginResponse, SignupRequest, UserResponse},
    error::AppResult,
};

pub struct AuthController {
    auth_service: Arc<AuthService>,
}

impl AuthController {
    pub fn new(auth_service: Arc<AuthService>) -> Self {
        Self { auth_service }
    }

    /// POST /auth/signup - Create an account on the Free plan
    pub async fn signup(
        State(controller): State<Arc<AuthController>>,
        Json(request): Json<SignupRequest>,
    ) -> AppResult<(StatusCode, Json<UserResponse>)> {
        let response = controller.auth_service.signup(request).await?;
        Ok((StatusCode::CREATED, Json(response)))
    }

    /// POST /auth/login - Authenticate and issue an access token
    pub async fn login(
        State(controller): State<Arc<AuthController>>,
        Json(request): Json<LoginRequest>,
    ) -> AppResult<Json<LoginResponse>> {
        let response = controller
            .auth_service
            .login(&request.email, &request.password)
            .await?;
        Ok(Json(response))
    }

    /// POST /auth/logout - Stateless tokens: nothing to revoke server-side
    pub async fn logout() -> StatusCode {
        StatusCode::NO_CONTENT
    }
}
