use super::{JwtManager, LoginResponse, SignupRequest, TokenResponse, UserResponse};
use crate::domain::plan::PlanName;
use crate::domain::subscription::SubscriptionService;
use crate::domain::user::User;
use crate::error::{AppError, AppResult};
use crate::infrastructure::repositories::{PlanRepository, UserRepository};
use std::sync::Arc;

const BCRYPT_COST: u32 = 12;
const MIN_PASSWORD_LENGTH: usize = 8;

pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    plan_repo: Arc<dyn PlanRepository>,
    subscription_service: Arc<SubscriptionService>,
    jwt_manager: JwtManager,
}

impl AuthService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        plan_repo: Arc<dyn PlanRepository>,
        subscription_service: Arc<SubscriptionService>,
        jwt_manager: JwtManager,
    ) -> Self {
        Self {
            user_repo,
            plan_repo,
            subscription_service,
            jwt_manager,
        }
    }

    /// Sign up with password credentials. Every new account starts on the
    /// Free plan with a fresh subscription.
    pub async fn signup(&self, request: SignupRequest) -> AppResult<UserResponse> {
        if request.name.is_empty() || request.email.is_empty() || request.password.is_empty() {
            return Err(AppError::BadRequest("All fields are required".to_string()));
        }
        if request.password.len() < MIN_PASSWORD_LENGTH {
            return Err(AppError::BadRequest(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        if self.user_repo.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::Conflict("User already exists".to_string()));
        }

        let password_hash = bcrypt::hash(&request.password, BCRYPT_COST)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;

        let user = self
            .user_repo
            .create(&request.name, &request.email, &password_hash)
            .await?;

        self.activate_free_plan(&user).await?;

        tracing::info!(user_id = %user.id, "User signed up");
        Ok(UserResponse::from(user))
    }

    /// Log in with password credentials and issue an access token
    pub async fn login(&self, email: &str, password: &str) -> AppResult<LoginResponse> {
        if email.is_empty() || password.is_empty() {
            return Err(AppError::BadRequest("All fields are required".to_string()));
        }

        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

        let password_hash = user
            .password_hash
            .as_deref()
            .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

        let matches = bcrypt::verify(password, password_hash)
            .map_err(|e| AppError::Internal(format!("Failed to verify password: {}", e)))?;
        if !matches {
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }

        let tokens = self.issue_tokens(&user)?;
        Ok(LoginResponse {
            user: UserResponse::from(user),
            tokens,
        })
    }

    /// Log in (or sign up on first contact) through an OAuth identity
    pub async fn oauth_login(
        &self,
        provider: &str,
        provider_id: &str,
        name: &str,
        email: &str,
        profile_picture: Option<&str>,
    ) -> AppResult<LoginResponse> {
        let user = match self.user_repo.find_by_email(email).await? {
            Some(existing) => existing,
            None => {
                let user = self
                    .user_repo
                    .create_oauth(name, email, provider, provider_id, profile_picture)
                    .await?;
                self.activate_free_plan(&user).await?;
                tracing::info!(user_id = %user.id, provider, "User created via OAuth");
                user
            }
        };

        let tokens = self.issue_tokens(&user)?;
        Ok(LoginResponse {
            user: UserResponse::from(user),
            tokens,
        })
    }

    fn issue_tokens(&self, user: &User) -> AppResult<TokenResponse> {
        let token = self.jwt_manager.generate_token(user.id, &user.email)?;
        Ok(TokenResponse {
            token,
            expires_in: self.jwt_manager.expires_in_seconds(),
        })
    }

    async fn activate_free_plan(&self, user: &User) -> AppResult<()> {
        let free_plan = self
            .plan_repo
            .find_by_name(PlanName::Free)
            .await?
            .ok_or_else(|| AppError::Internal("Free plan not found".to_string()))?;

        let subscription = self
            .subscription_service
            .create_for_plan(user.id, &free_plan, None)
            .await
            .map_err(AppError::from)?;

        self.user_repo
            .set_active_plan(user.id, free_plan.id, subscription.subscription_end)
            .await?;

        Ok(())
    }
}
