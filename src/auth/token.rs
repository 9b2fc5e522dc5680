//! Token issuer: mints and validates signed access/refresh tokens
//!
//! Tokens are stateless HS256 JWTs; validity is purely a function of
//! signature, expiry and token type. Refresh revocation is checked
//! separately against storage by the refresh endpoint.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use std::env;

use super::models::{Claims, TokenPair};
use crate::common::{generate_raw_id, ApiError};

pub const TOKEN_TYPE_ACCESS: &str = "access";
pub const TOKEN_TYPE_REFRESH: &str = "refresh";

/// Stateless signer/verifier for access and refresh tokens
#[derive(Clone)]
pub struct TokenIssuer {
    secret: String,
    access_minutes: i64,
    refresh_days: i64,
}

impl TokenIssuer {
    pub fn new(secret: impl Into<String>, access_minutes: i64, refresh_days: i64) -> Self {
        Self {
            secret: secret.into(),
            access_minutes,
            refresh_days,
        }
    }

    /// Build from environment: JWT_SECRET plus optional
    /// ACCESS_TOKEN_MINUTES (default 60) and REFRESH_TOKEN_DAYS (default 7)
    pub fn from_env() -> Self {
        let secret =
            env::var("JWT_SECRET").unwrap_or_else(|_| "replace_with_strong_secret".to_string());
        let access_minutes = env::var("ACCESS_TOKEN_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);
        let refresh_days = env::var("REFRESH_TOKEN_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(7);

        Self::new(secret, access_minutes, refresh_days)
    }

    /// Mint an access/refresh pair for a verified identity
    pub fn issue(&self, user_id: &str) -> Result<TokenPair, ApiError> {
        let access_token = self.encode_token(
            user_id,
            Duration::minutes(self.access_minutes),
            TOKEN_TYPE_ACCESS,
        )?;
        let refresh_token = self.encode_token(
            user_id,
            Duration::days(self.refresh_days),
            TOKEN_TYPE_REFRESH,
        )?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Mint a fresh access token (used by the refresh endpoint)
    pub fn issue_access(&self, user_id: &str) -> Result<String, ApiError> {
        self.encode_token(
            user_id,
            Duration::minutes(self.access_minutes),
            TOKEN_TYPE_ACCESS,
        )
    }

    /// Validate an access token and return its claims
    pub fn verify_access(&self, token: &str) -> Result<Claims, ApiError> {
        self.decode_token(token, TOKEN_TYPE_ACCESS)
    }

    /// Validate a refresh token and return its claims
    pub fn verify_refresh(&self, token: &str) -> Result<Claims, ApiError> {
        self.decode_token(token, TOKEN_TYPE_REFRESH)
    }

    fn encode_token(
        &self,
        user_id: &str,
        ttl: Duration,
        token_type: &str,
    ) -> Result<String, ApiError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + ttl).timestamp() as usize,
            iat: now.timestamp() as usize,
            jti: generate_raw_id(16),
            token_type: token_type.to_string(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|_| ApiError::InternalServer("jwt error".to_string()))
    }

    fn decode_token(&self, token: &str, expected_type: &str) -> Result<Claims, ApiError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => ApiError::TokenExpired,
            _ => ApiError::TokenInvalid,
        })?;

        // A refresh token at the gate (or an access token at the refresh
        // endpoint) has a valid signature but the wrong type.
        if data.claims.token_type != expected_type {
            return Err(ApiError::TokenInvalid);
        }

        Ok(data.claims)
    }
}
