pub mod dto;
pub mod jwt;
pub mod service;

pub use dto::{LoginRequest, LoginResponse, SignupRequest, TokenResponse, UserResponse};
pub use jwt::{ApiKeyClaims, ApiKeyManager, Claims, JwtManager};
pub use service::AuthService;
