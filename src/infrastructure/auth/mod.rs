pub mod api_key;
pub mod middleware;
pub mod request_id;

pub use api_key::{api_key_middleware, ApiKeyIdentity};
pub use middleware::{auth_middleware, AuthUser};
pub use request_id::{request_id_middleware, RequestId};
