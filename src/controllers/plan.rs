use axum::{
    extract::{Path, State},
    Extension, Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::plan::{Plan, PlanService},
    error::AppResult,
    infrastructure::auth::AuthUser,
};

pub struct PlanController {
    plan_service: Arc<PlanService>,
}

impl PlanController {
    pub fn new(plan_service: Arc<PlanService>) -> Self {
        Self { plan_service }
    }

    /// GET /api/plans - List all plans
    pub async fn list_plans(
        State(controller): State<Arc<PlanController>>,
    ) -> AppResult<Json<Vec<Plan>>> {
        let plans = controller.plan_service.list_plans().await?;
        Ok(Json(plans))
    }

    /// GET /api/plans/:planId - Get one plan
    pub async fn get_plan(
        State(controller): State<Arc<PlanController>>,
        Path(plan_id): Path<Uuid>,
    ) -> AppResult<Json<Plan>> {
        let plan = controller.plan_service.get_plan(plan_id).await?;
        Ok(Json(plan))
    }

    /// GET /api/plans/me - Get the caller's active plan
    pub async fn get_my_plan(
        State(controller): State<Arc<PlanController>>,
        Extension(auth_user): Extension<AuthUser>,
    ) -> AppResult<Json<Plan>> {
        let plan = controller.plan_service.get_my_plan(auth_user.user_id).await?;
        Ok(Json(plan))
    }
}
