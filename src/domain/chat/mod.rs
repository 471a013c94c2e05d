pub mod error;
pub mod service;

pub use error::ChatError;
pub use service::{ChatAnswer, ChatService};
