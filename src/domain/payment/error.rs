use crate::domain::subscription::SubscriptionError;
use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("dependency error: {0}")]
    Dependency(String),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("plan not found")]
    PlanNotFound,
    #[error("signature mismatch")]
    VerificationFailed,
    #[error("gateway error: {0}")]
    Gateway(String),
    #[error("subscription error: {0}")]
    Subscription(#[from] SubscriptionError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<AppError> for PaymentError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::BadRequest(msg) => PaymentError::Invalid(msg),
            AppError::NotFound(_) => PaymentError::PlanNotFound,
            _ => PaymentError::Dependency(err.to_string()),
        }
    }
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::Invalid(msg) => AppError::BadRequest(msg),
            PaymentError::PlanNotFound => AppError::NotFound("Plan not found".to_string()),
            PaymentError::VerificationFailed => {
                AppError::PaymentVerificationFailed("Invalid payment signature".to_string())
            }
            PaymentError::Gateway(msg) => AppError::ExternalService(msg),
            PaymentError::Subscription(e) => e.into(),
            PaymentError::Dependency(msg) => AppError::Internal(msg),
            PaymentError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}
