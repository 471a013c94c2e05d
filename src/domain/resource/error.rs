use crate::domain::subscription::SubscriptionError;
use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("dependency error: {0}")]
    Dependency(String),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("resource not found")]
    NotFound,
    #[error("resource already exists")]
    Conflict,
    #[error("subscription error: {0}")]
    Subscription(#[from] SubscriptionError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<AppError> for ResourceError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::BadRequest(msg) => ResourceError::Invalid(msg),
            AppError::NotFound(_) => ResourceError::NotFound,
            AppError::Conflict(_) => ResourceError::Conflict,
            _ => ResourceError::Dependency(err.to_string()),
        }
    }
}

impl From<ResourceError> for AppError {
    fn from(err: ResourceError) -> Self {
        match err {
            ResourceError::Invalid(msg) => AppError::BadRequest(msg),
            ResourceError::NotFound => AppError::NotFound("Resource not found".to_string()),
            ResourceError::Conflict => AppError::Conflict("Resource already exists".to_string()),
            ResourceError::Subscription(e) => e.into(),
            ResourceError::Dependency(msg) => AppError::Internal(msg),
            ResourceError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}
