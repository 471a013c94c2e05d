use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum SubscriptionError {
    #[error("dependency error: {0}")]
    Dependency(String),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("no active subscription found")]
    NoActiveSubscription,
    #[error("not enough credits")]
    InsufficientCredits,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<AppError> for SubscriptionError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::BadRequest(msg) => SubscriptionError::Invalid(msg),
            AppError::NotFound(_) => SubscriptionError::NoActiveSubscription,
            AppError::InsufficientCredits(_) => SubscriptionError::InsufficientCredits,
            _ => SubscriptionError::Dependency(err.to_string()),
        }
    }
}

impl From<SubscriptionError> for AppError {
    fn from(err: SubscriptionError) -> Self {
        match err {
            SubscriptionError::Invalid(msg) => AppError::BadRequest(msg),
            SubscriptionError::NoActiveSubscription => {
                AppError::NotFound("No active subscription found".to_string())
            }
            SubscriptionError::InsufficientCredits => {
                AppError::InsufficientCredits("Not enough credits for this action".to_string())
            }
            SubscriptionError::Dependency(msg) => AppError::Internal(msg),
            SubscriptionError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}
