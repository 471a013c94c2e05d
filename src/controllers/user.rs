use axum::{extract::State, Extension, Json};
use std::sync::Arc;

use crate::{
    domain::user::{MeResponse, UserService},
    error::AppResult,
    infrastructure::auth::AuthUser,
};

pub struct UserController {
    user_service: Arc<UserService>,
}

impl UserController {
    pub fn new(user_service: Arc<UserService>) -> Self {
        Self { user_service }
    }

    /// GET /api/me - Get current user profile
    pub async fn get_me(
        State(controller): State<Arc<UserController>>,
        Extension(auth_user): Extension<AuthUser>,
    ) -> AppResult<Json<MeResponse>> {
        let response = controller.user_service.get_profile(auth_user.user_id).await?;
        Ok(Json(response))
    }
}
