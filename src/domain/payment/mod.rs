pub mod dto;
pub mod error;
pub mod service;

pub use dto::{CreateOrderRequest, CreateOrderResponse, PaymentClaim, PaymentVerified};
pub use error::PaymentError;
pub use service::PaymentService;
