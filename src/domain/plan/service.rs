use super::model::Plan;
use crate::error::{AppError, AppResult};
use crate::infrastructure::repositories::{PlanRepository, UserRepository};
use std::sync::Arc;
use uuid::Uuid;

pub struct PlanService {
    plan_repo: Arc<dyn PlanRepository>,
    user_repo: Arc<dyn UserRepository>,
}

impl PlanService {
    pub fn new(plan_repo: Arc<dyn PlanRepository>, user_repo: Arc<dyn UserRepository>) -> Self {
        Self {
            plan_repo,
            user_repo,
        }
    }

    pub async fn list_plans(&self) -> AppResult<Vec<Plan>> {
        self.plan_repo.find_all().await
    }

    pub async fn get_plan(&self, plan_id: Uuid) -> AppResult<Plan> {
        self.plan_repo
            .find_by_id(plan_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Plan not found".to_string()))
    }

    /// The plan the user is currently subscribed to
    pub async fn get_my_plan(&self, user_id: Uuid) -> AppResult<Plan> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let plan_id = user
            .active_plan_id
            .ok_or_else(|| AppError::NotFound("No active plan found".to_string()))?;

        self.get_plan(plan_id).await
    }
}
