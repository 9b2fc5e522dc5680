//! Authentication data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// JWT claims structure
///
/// `token_type` distinguishes access from refresh tokens so a refresh token
/// presented at the authorization gate (or vice versa) is rejected.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
    pub jti: String,
    pub token_type: String,
}

/// User database model
///
/// `password_hash` is NULL for OAuth-only accounts. Neither the hash nor the
/// disabled flag is ever serialized into API responses.
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub role: String,
    pub bio: String,
    pub avatar: Option<String>,
    #[serde(skip_serializing)]
    pub disabled: i64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled != 0
    }
}

/// Access/refresh token pair returned by login, register and OAuth callback
#[derive(Serialize, Debug)]
pub struct TokenPair {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}

#[derive(Deserialize, Debug)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password2: String,
}

#[derive(Deserialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Debug)]
pub struct RefreshRequest {
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}

/// Query parameters a provider sends back to the OAuth callback
#[derive(Deserialize, Debug)]
pub struct OAuthCallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}
