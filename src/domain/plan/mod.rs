pub mod model;
pub mod service;

pub use model::{Feature, FeatureKind, Plan, PlanName};
pub use service::PlanService;
