use super::dto::{ActivePlanDto, CreditsDto, MeResponse};
use crate::error::{AppError, AppResult};
use crate::infrastructure::repositories::{
    PlanRepository, SubscriptionRepository, UserRepository,
};
use std::sync::Arc;
use uuid::Uuid;

pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    plan_repo: Arc<dyn PlanRepository>,
    subscription_repo: Arc<dyn SubscriptionRepository>,
}

impl UserService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        plan_repo: Arc<dyn PlanRepository>,
        subscription_repo: Arc<dyn SubscriptionRepository>,
    ) -> Self {
        Self {
            user_repo,
            plan_repo,
            subscription_repo,
        }
    }

    /// Get the user profile with active plan and credit balance
    pub async fn get_profile(&self, user_id: Uuid) -> AppResult<MeResponse> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let plan = match user.active_plan_id {
            Some(plan_id) => self.plan_repo.find_by_id(plan_id).await?,
            None => None,
        };

        let credits = self
            .subscription_repo
            .find_active_for_user(user_id)
            .await?
            .map(|sub| CreditsDto {
                total: sub.total_credits,
                used: sub.credits_used,
                left: sub.credits_left(),
            });

        Ok(MeResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            profile_picture: user.profile_picture,
            plan: plan.map(|p| ActivePlanDto {
                id: p.id,
                name: p.name.to_string(),
                total_credits: p.total_credits,
            }),
            plan_expires_at: user.plan_expires_at,
            credits,
        })
    }
}
