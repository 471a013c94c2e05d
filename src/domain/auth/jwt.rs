use crate::error::{AppError, AppResult};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub email: String,
    pub exp: i64, // Expiration time
    pub iat: i64, // Issued at
}

pub struct JwtManager {
    secret: String,
    expiration_hours: i64,
}

impl JwtManager {
    pub fn new(secret: String, expiration_hours: i64) -> Self {
        Self {
            secret,
            expiration_hours,
        }
    }

    /// Generate a JWT access token for a user
    pub fn generate_token(&self, user_id: Uuid, email: &str) -> AppResult<String> {
        let now = Utc::now();
        let exp = now + Duration::hours(self.expiration_hours);

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Validate a JWT token and extract claims
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
    }

    pub fn expires_in_seconds(&self) -> i64 {
        self.expiration_hours * 3600
    }
}

/// Claims carried inside a signed API key. The plan name travels with
/// the key so API-key requests can be billed without a user lookup.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiKeyClaims {
    pub sub: String, // User ID
    pub plan: String,
    pub order_id: String,
    pub exp: i64,
    pub iat: i64,
}

impl ApiKeyClaims {
    pub fn user_id(&self) -> AppResult<Uuid> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| AppError::Unauthorized("Invalid user ID in API key".to_string()))
    }
}

/// Issues and verifies the signed API keys created at payment
/// verification. Uses a secret distinct from the session JWT secret.
pub struct ApiKeyManager {
    secret: String,
}

impl ApiKeyManager {
    pub fn new(secret: String) -> Self {
        Self { secret }
    }

    pub fn issue(
        &self,
        user_id: Uuid,
        plan: &str,
        order_id: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<String> {
        let claims = ApiKeyClaims {
            sub: user_id.to_string(),
            plan: plan.to_string(),
            order_id: order_id.to_string(),
            exp: expires_at.timestamp(),
            iat: Utc::now().timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Failed to issue API key: {}", e)))
    }

    pub fn verify(&self, key: &str) -> AppResult<ApiKeyClaims> {
        decode::<ApiKeyClaims>(
            key,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| AppError::Unauthorized(format!("Invalid API key: {}", e)))
    }
}
