//! Authentication extractors for Axum
//!
//! The authorization gate: every protected handler takes an `AuthedUser`
//! argument, which validates the bearer token and loads the acting identity
//! before the handler body runs. Handlers that serve both anonymous and
//! authenticated readers take `MaybeAuthedUser` instead.

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::store;
use crate::common::{safe_email_log, ApiError, AppState};

/// Authenticated user extractor
///
/// The resolved identity is the explicit request-scoped context handed to
/// handlers; downstream ownership checks compare against `id` and `role`.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub id: String,
    pub email: String,
    pub username: String,
    pub role: String,
}

impl AuthedUser {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(state_lock): Extension<Arc<RwLock<AppState>>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let app_state = state_lock.read().await.clone();

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let header = match header {
            Some(h) => h,
            None => {
                warn!("Authentication failed: missing Authorization header");
                return Err(ApiError::MissingToken);
            }
        };

        // Handle "Bearer <token>" format or raw token
        let token = header.strip_prefix("Bearer ").unwrap_or(header);

        let claims = app_state.tokens.verify_access(token).map_err(|e| {
            warn!(error = %e, "Access token validation failed");
            e
        })?;

        let user = store::find_by_id(&app_state.db, &claims.sub).await?;

        // A missing or disabled account gets the same response as a bad
        // token so the gate never reveals account status.
        match user {
            Some(u) if !u.is_disabled() => {
                debug!(
                    user_id = %u.id,
                    email = %safe_email_log(&u.email),
                    role = %u.role,
                    "Request authenticated"
                );
                Ok(AuthedUser {
                    id: u.id,
                    email: u.email,
                    username: u.username,
                    role: u.role,
                })
            }
            _ => {
                warn!(user_id = %claims.sub, "Authentication failed: no usable account for token subject");
                Err(ApiError::TokenInvalid)
            }
        }
    }
}

/// Optional variant of `AuthedUser` for endpoints readable anonymously
///
/// No Authorization header resolves to `None`; a header that is present but
/// invalid is still an error, matching the strict gate.
#[derive(Debug)]
pub struct MaybeAuthedUser(pub Option<AuthedUser>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeAuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if parts.headers.get(AUTHORIZATION).is_none() {
            return Ok(MaybeAuthedUser(None));
        }
        let user = AuthedUser::from_request_parts(parts, state).await?;
        Ok(MaybeAuthedUser(Some(user)))
    }
}
