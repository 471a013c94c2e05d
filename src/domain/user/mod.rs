pub mod dto;
pub mod model;
pub mod service;

pub use dto::{ActivePlanDto, CreditsDto, MeResponse};
pub use model::{ApiKey, User};
pub use service::UserService;
