use crate::domain::subscription::SubscriptionError;
use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("dependency error: {0}")]
    Dependency(String),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("no active resource selected")]
    NoActiveResource,
    #[error("subscription error: {0}")]
    Subscription(#[from] SubscriptionError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<AppError> for ChatError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::BadRequest(msg) => ChatError::Invalid(msg),
            AppError::NotFound(_) => ChatError::NoActiveResource,
            _ => ChatError::Dependency(err.to_string()),
        }
    }
}

impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Invalid(msg) => AppError::BadRequest(msg),
            ChatError::NoActiveResource => {
                AppError::NotFound("No active file or URL selected".to_string())
            }
            ChatError::Subscription(e) => e.into(),
            ChatError::Dependency(msg) => AppError::ExternalService(msg),
            ChatError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}
