//! JWT service for token generation and validation
//!
//! This module provides functionality for creating and validating JWT
//! tokens using the HS256 algorithm, signed with the shared `JWT_SECRET`.

use anyhow::Result;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::models::User;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared secret for signing and verifying tokens
    pub secret: String,
    /// Access token expiration time in seconds (default: 24 hours)
    pub access_token_expiry: u64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_SECRET`: Shared secret for signing tokens
    /// - `JWT_ACCESS_TOKEN_EXPIRY`: Access token expiry in seconds (default: 86400)
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable not set"))?;

        let access_token_expiry = std::env::var("JWT_ACCESS_TOKEN_EXPIRY")
            .unwrap_or_else(|_| "86400".to_string()) // 24 hours
            .parse()
            .unwrap_or(86400);

        Ok(JwtConfig {
            secret,
            access_token_expiry,
        })
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    /// User role
    pub role: String,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Result<Self> {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
        validation.validate_exp = true;

        Ok(JwtService {
            encoding_key,
            decoding_key,
            validation,
            config,
        })
    }

    /// Generate an access token for a user
    pub fn generate_access_token(&self, user: &User) -> Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| anyhow::anyhow!("Failed to get current time: {}", e))?
            .as_secs();

        let claims = Claims {
            sub: user.id,
            role: user.role.as_str().to_string(),
            iat: now,
            exp: now + self.config.access_token_expiry,
        };

        let token = encode(
            &Header::new(jsonwebtoken::Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?;
        Ok(token)
    }

    /// Validate a token and return the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }

    /// Get the access token expiry time
    pub fn access_token_expiry(&self) -> u64 {
        self.config.access_token_expiry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;
    use chrono::Utc;

    fn test_service() -> JwtService {
        let config = JwtConfig {
            secret: "test-secret-not-for-production".to_string(),
            access_token_expiry: 3600,
        };
        JwtService::new(config).expect("failed to build JWT service")
    }

    fn test_user(role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            email: "parent@example.com".to_string(),
            password_hash: String::new(),
            first_name: "Jamie".to_string(),
            last_name: "Doe".to_string(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_token_round_trip() {
        let service = test_service();
        let user = test_user(UserRole::Parent);

        let token = service
            .generate_access_token(&user)
            .expect("token generation failed");
        let claims = service
            .validate_token(&token)
            .expect("token validation failed");

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, "parent");
        assert_eq!(claims.exp, claims.iat + 3600);
    }

    #[test]
    fn test_admin_role_claim() {
        let service = test_service();
        let user = test_user(UserRole::Admin);

        let token = service
            .generate_access_token(&user)
            .expect("token generation failed");
        let claims = service
            .validate_token(&token)
            .expect("token validation failed");

        assert_eq!(claims.role, "admin");
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let service = test_service();
        let user = test_user(UserRole::Parent);

        let token = service
            .generate_access_token(&user)
            .expect("token generation failed");

        let other = JwtService::new(JwtConfig {
            secret: "a-different-secret".to_string(),
            access_token_expiry: 3600,
        })
        .expect("failed to build JWT service");

        assert!(other.validate_token(&token).is_err());
    }
}
