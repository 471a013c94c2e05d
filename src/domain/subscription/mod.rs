pub mod error;
pub mod model;
pub mod service;

pub use error::SubscriptionError;
pub use model::{PaymentRecord, Subscription, SubscriptionStatus};
pub use service::SubscriptionService;
