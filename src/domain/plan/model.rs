use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Closed set of subscription tiers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PlanName {
    Free,
    Pro,
    Enterprise,
}

impl PlanName {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Free" => Some(PlanName::Free),
            "Pro" => Some(PlanName::Pro),
            "Enterprise" => Some(PlanName::Enterprise),
            _ => None,
        }
    }
}

impl std::fmt::Display for PlanName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanName::Free => write!(f, "Free"),
            PlanName::Pro => write!(f, "Pro"),
            PlanName::Enterprise => write!(f, "Enterprise"),
        }
    }
}

/// Closed set of billable features
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    AiMessage,
    FileUpload,
    UrlUpload,
}

impl std::fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureKind::AiMessage => write!(f, "ai_message"),
            FeatureKind::FileUpload => write!(f, "file_upload"),
            FeatureKind::UrlUpload => write!(f, "url_upload"),
        }
    }
}

/// Per-plan entry naming a billable action and its unit cost
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    pub name: FeatureKind,
    pub per_unit_credit_cost: i64,
    pub max_units_allowed: i64,
    pub allocated_credits: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: Uuid,
    pub name: PlanName,
    pub price: i64,
    pub duration_days: i32,
    pub total_credits: i64,
    pub is_active: bool,
    pub features: Vec<Feature>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Plan {
    /// Unit credit cost of a feature, if the plan carries it
    pub fn unit_cost(&self, kind: FeatureKind) -> Option<i64> {
        self.features
            .iter()
            .find(|f| f.name == kind)
            .map(|f| f.per_unit_credit_cost)
    }

    /// Validate the plan invariants: at least one feature, no negative
    /// numbers anywhere, duration of at least one day.
    pub fn validate(&self) -> Result<(), String> {
        if self.features.is_empty() {
            return Err("a plan requires at least one feature".to_string());
        }
        if self.price < 0 {
            return Err("price cannot be negative".to_string());
        }
        if self.duration_days < 1 {
            return Err("duration must be at least 1 day".to_string());
        }
        if self.total_credits < 0 {
            return Err("total credits cannot be negative".to_string());
        }
        for feature in &self.features {
            if feature.per_unit_credit_cost < 0
                || feature.max_units_allowed < 0
                || feature.allocated_credits < 0
            {
                return Err(format!("feature {} has a negative value", feature.name));
            }
        }
        Ok(())
    }
}
