pub mod error;
pub mod model;
pub mod service;

pub use error::ResourceError;
pub use model::{FileResource, ResourceKind, WebsiteUrl};
pub use service::{ResourceService, UploadReceipt};
