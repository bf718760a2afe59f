use crate::config::AuthConfig;
use crate::error::{AuthError, Result};
use crate::models::{User, UserRole};
use anyhow::anyhow;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by short-lived access tokens: identity plus the
/// authorization context the API layer needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (user id).
    pub sub: Uuid,
    pub email: String,
    pub role: UserRole,
    /// Issued at (seconds since epoch).
    pub iat: i64,
    /// Expiration (seconds since epoch).
    pub exp: i64,
}

/// Claims carried by long-lived refresh tokens: identity only. Refresh
/// tokens exist solely to mint new access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// Stateless HS256 token issuance and validation. Access and refresh
/// tokens use distinct secrets, so one kind never verifies as the other.
pub struct TokenIssuer {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
    validation: Validation,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let access_secret = config.access_secret.expose_secret().as_bytes();
        let refresh_secret = config.refresh_secret.expose_secret().as_bytes();

        // Zero leeway: an expired token is rejected the second it expires.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            access_encoding: EncodingKey::from_secret(access_secret),
            access_decoding: DecodingKey::from_secret(access_secret),
            refresh_encoding: EncodingKey::from_secret(refresh_secret),
            refresh_decoding: DecodingKey::from_secret(refresh_secret),
            access_ttl: Duration::minutes(config.access_ttl_minutes),
            refresh_ttl: Duration::days(config.refresh_ttl_days),
            validation,
        }
    }

    pub fn issue_access_token(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + self.access_ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.access_encoding)
            .map_err(|err| AuthError::Internal(anyhow!("access token signing failed: {err}")))
    }

    pub fn issue_refresh_token(&self, user_id: Uuid) -> Result<String> {
        let now = Utc::now();
        let claims = RefreshClaims {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + self.refresh_ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.refresh_encoding)
            .map_err(|err| AuthError::Internal(anyhow!("refresh token signing failed: {err}")))
    }

    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims> {
        decode::<AccessClaims>(token, &self.access_decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::Unauthorized("Invalid or expired access token".into()))
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<RefreshClaims> {
        decode::<RefreshClaims>(token, &self.refresh_decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::Unauthorized("Invalid or expired refresh token".into()))
    }
}
