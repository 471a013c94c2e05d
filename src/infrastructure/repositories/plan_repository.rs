use crate::domain::plan::{Feature, Plan, PlanName};
use crate::error::{AppError, AppResult};
use crate::infrastructure::db::DbPool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::sync::Arc;
use uuid::Uuid;

#[async_trait]
pub trait PlanRepository: Send + Sync {
    async fn find_all(&self) -> AppResult<Vec<Plan>>;
    async fn find_by_id(&self, plan_id: Uuid) -> AppResult<Option<Plan>>;
    async fn find_by_name(&self, name: PlanName) -> AppResult<Option<Plan>>;
    async fn insert(&self, plan: &Plan) -> AppResult<()>;
}

#[derive(Debug, FromRow)]
struct PlanRow {
    id: Uuid,
    name: String,
    price: i64,
    duration_days: i32,
    total_credits: i64,
    is_active: bool,
    features: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PlanRow> for Plan {
    type Error = AppError;

    fn try_from(row: PlanRow) -> Result<Self, Self::Error> {
        let name = PlanName::parse(&row.name)
            .ok_or_else(|| AppError::Internal(format!("unknown plan name: {}", row.name)))?;
        let features: Vec<Feature> = serde_json::from_value(row.features)
            .map_err(|e| AppError::Internal(format!("invalid plan features: {}", e)))?;

        Ok(Plan {
            id: row.id,
            name,
            price: row.price,
            duration_days: row.duration_days,
            total_credits: row.total_credits,
            is_active: row.is_active,
            features,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub struct PgPlanRepository {
    pool: Arc<DbPool>,
}

impl PgPlanRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlanRepository for PgPlanRepository {
    async fn find_all(&self) -> AppResult<Vec<Plan>> {
        let pool = self.pool.as_ref();
        let rows = sqlx::query_as::<_, PlanRow>("SELECT * FROM plans ORDER BY price ASC")
            .fetch_all(pool)
            .await?;

        rows.into_iter().map(Plan::try_from).collect()
    }

    async fn find_by_id(&self, plan_id: Uuid) -> AppResult<Option<Plan>> {
        let pool = self.pool.as_ref();
        let row = sqlx::query_as::<_, PlanRow>("SELECT * FROM plans WHERE id = $1")
            .bind(plan_id)
            .fetch_optional(pool)
            .await?;

        row.map(Plan::try_from).transpose()
    }

    async fn find_by_name(&self, name: PlanName) -> AppResult<Option<Plan>> {
        let pool = self.pool.as_ref();
        let row = sqlx::query_as::<_, PlanRow>("SELECT * FROM plans WHERE name = $1")
            .bind(name.to_string())
            .fetch_optional(pool)
            .await?;

        row.map(Plan::try_from).transpose()
    }

    async fn insert(&self, plan: &Plan) -> AppResult<()> {
        plan.validate().map_err(AppError::BadRequest)?;

        let pool = self.pool.as_ref();
        let features = serde_json::to_value(&plan.features)
            .map_err(|e| AppError::Internal(format!("failed to serialize features: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO plans (id, name, price, duration_days, total_credits, is_active, features, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(plan.id)
        .bind(plan.name.to_string())
        .bind(plan.price)
        .bind(plan.duration_days)
        .bind(plan.total_credits)
        .bind(plan.is_active)
        .bind(features)
        .bind(plan.created_at)
        .bind(plan.updated_at)
        .execute(pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict("Plan name already exists".to_string());
                }
            }
            AppError::Database(e)
        })?;

        Ok(())
    }
}
