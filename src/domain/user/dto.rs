use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Response for GET /api/me
#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<ActivePlanDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credits: Option<CreditsDto>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ActivePlanDto {
    pub id: Uuid,
    pub name: String,
    pub total_credits: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreditsDto {
    pub total: i64,
    pub used: i64,
    pub left: i64,
}
