use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    domain::chat::ChatService,
    domain::plan::PlanName,
    error::{AppError, AppResult},
    infrastructure::auth::ApiKeyIdentity,
    infrastructure::repositories::PlanRepository,
};

const MAX_QUESTION_LENGTH: usize = 4000;

/// Request for POST /v1/chat/ask
#[derive(Debug, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    pub credits_left: i64,
}

pub struct ChatController {
    chat_service: Arc<ChatService>,
    plan_repo: Arc<dyn PlanRepository>,
}

impl ChatController {
    pub fn new(chat_service: Arc<ChatService>, plan_repo: Arc<dyn PlanRepository>) -> Self {
        Self {
            chat_service,
            plan_repo,
        }
    }

    /// POST /v1/chat/ask - Answer a question against the active resource.
    /// Authenticated with an API key; billed under the plan the key was
    /// issued for.
    pub async fn ask(
        State(controller): State<Arc<ChatController>>,
        Extension(identity): Extension<ApiKeyIdentity>,
        Json(request): Json<AskRequest>,
    ) -> AppResult<Json<AskResponse>> {
        if request.question.trim().is_empty() {
            return Err(AppError::BadRequest("Question cannot be empty".to_string()));
        }
        if request.question.len() > MAX_QUESTION_LENGTH {
            return Err(AppError::BadRequest(
                "Question must be 4,000 characters or less".to_string(),
            ));
        }

        let plan_name = PlanName::parse(&identity.plan)
            .ok_or_else(|| AppError::Unauthorized("Unknown plan in API key".to_string()))?;
        let plan = controller
            .plan_repo
            .find_by_name(plan_name)
            .await?
            .ok_or_else(|| AppError::NotFound("Plan not found".to_string()))?;

        let answer = controller
            .chat_service
            .ask(identity.user_id, plan.id, &request.question)
            .await
            .map_err(AppError::from)?;

        Ok(Json(AskResponse {
            answer: answer.answer,
            credits_left: answer.credits_left,
        }))
    }
}
