//! Authentication handlers

use axum::{
    extract::{Extension, Json, Path, Query},
    http::StatusCode,
    response::Redirect,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::extractors::AuthedUser;
use super::models::{LoginRequest, OAuthCallbackParams, RefreshRequest, RegisterRequest};
use super::oauth::{self, Provider};
use super::password::hash_password;
use super::store::{self, OAuthProfileHints};
use crate::common::helpers::safe_token_log;
use crate::common::{safe_email_log, ApiError, AppState, Validator};

/// POST /auth/register
/// Creates an account and signs the new user in
///
/// # Request Body
/// ```json
/// {
///   "username": "writer",
///   "email": "writer@example.com",
///   "password": "...",
///   "password2": "..."
/// }
/// ```
pub async fn register(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let state = state_lock.read().await.clone();

    let validation = payload.validate(&payload);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let password_hash = hash_password(&payload.password)?;
    let user = store::create_user(
        &state.db,
        payload.email.trim(),
        payload.username.trim(),
        Some(&password_hash),
    )
    .await?;

    let pair = state.tokens.issue(&user.id)?;

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        "User registered via email/password"
    );

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "user": user,
            "accessToken": pair.access_token,
            "refreshToken": pair.refresh_token,
        })),
    ))
}

/// POST /auth/login
/// Verifies email/password and returns an access/refresh token pair
///
/// Unknown email and wrong password produce the identical 401 response.
pub async fn login(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let validation = payload.validate(&payload);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let user = store::authenticate(&state.db, payload.email.trim(), &payload.password).await?;
    let pair = state.tokens.issue(&user.id)?;

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        "User logged in"
    );

    Ok(Json(serde_json::json!({
        "accessToken": pair.access_token,
        "refreshToken": pair.refresh_token,
    })))
}

/// POST /auth/refresh
/// Mints a new access token from a valid, unrevoked refresh token
pub async fn refresh(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let claims = state.tokens.verify_refresh(&payload.refresh_token)?;

    if store::is_token_revoked(&state.db, &claims.jti).await? {
        warn!(
            user_id = %claims.sub,
            token = %safe_token_log(&payload.refresh_token),
            "Refresh rejected: token revoked"
        );
        return Err(ApiError::TokenRevoked);
    }

    // The subject must still resolve to a live account.
    match store::find_by_id(&state.db, &claims.sub).await? {
        Some(u) if !u.is_disabled() => {}
        _ => return Err(ApiError::TokenInvalid),
    }

    let access_token = state.tokens.issue_access(&claims.sub)?;

    debug!(user_id = %claims.sub, "Access token refreshed");

    Ok(Json(serde_json::json!({ "accessToken": access_token })))
}

/// POST /auth/logout
/// Revokes the presented refresh token; the access token simply expires
pub async fn logout(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let claims = state.tokens.verify_refresh(&payload.refresh_token)?;
    if claims.sub != authed.id {
        return Err(ApiError::TokenInvalid);
    }

    store::revoke_token(&state.db, &claims.jti, &authed.id).await?;

    info!(user_id = %authed.id, "User logged out, refresh token revoked");

    Ok(Json(serde_json::json!({ "message": "Logged out successfully." })))
}

/// GET /auth/oauth/:provider/redirect
/// Starts the OAuth flow: issues an anti-forgery state and redirects the
/// client to the provider's authorization endpoint
pub async fn oauth_redirect(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path(provider): Path<String>,
) -> Result<Redirect, ApiError> {
    let state = state_lock.read().await.clone();

    let provider: Provider = provider.parse()?;
    let creds = state.oauth.credentials(provider)?;

    let oauth_state = store::issue_oauth_state(&state.db, provider.as_str()).await?;
    let redirect_uri = state.oauth.redirect_uri(provider);
    let auth_url = oauth::authorization_url(provider, creds, &redirect_uri, &oauth_state);

    info!(provider = %provider, "Redirecting to OAuth provider");

    Ok(Redirect::to(&auth_url))
}

/// GET /auth/oauth/:provider/callback
/// Completes the OAuth flow: verifies state, exchanges the code, resolves
/// the local identity and issues tokens
///
/// Every step is one-way; any failure terminates the attempt and the client
/// restarts at the redirect endpoint.
pub async fn oauth_callback(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path(provider): Path<String>,
    Query(params): Query<OAuthCallbackParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let provider: Provider = provider.parse()?;
    let creds = state.oauth.credentials(provider)?;

    // State is checked before the code is even looked at: a forged or
    // replayed callback fails here no matter how valid its code is.
    let returned_state = params.state.as_deref().ok_or(ApiError::StateMismatch)?;
    store::consume_oauth_state(&state.db, provider.as_str(), returned_state).await?;

    if let Some(error) = params.error {
        warn!(provider = %provider, oauth_error = %error, "Provider returned an error on callback");
        return Err(ApiError::ProviderExchangeFailed(error));
    }

    let code = params
        .code
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("missing authorization code".to_string()))?;

    let redirect_uri = state.oauth.redirect_uri(provider);
    let access = oauth::exchange_code(&state.http, provider, creds, code, &redirect_uri).await?;
    let profile = oauth::fetch_profile(&state.http, provider, &access).await?;

    debug!(
        provider = %provider,
        provider_user_id = %profile.provider_user_id,
        email = %safe_email_log(&profile.email),
        "Provider profile fetched, resolving local identity"
    );

    let hints = OAuthProfileHints {
        email: profile.email,
        username: profile.username,
        avatar: profile.avatar,
    };
    let user = store::find_or_create_by_oauth(
        &state.db,
        provider.as_str(),
        &profile.provider_user_id,
        &hints,
    )
    .await?;

    if user.is_disabled() {
        return Err(ApiError::InvalidCredentials);
    }

    let pair = state.tokens.issue(&user.id)?;

    info!(
        user_id = %user.id,
        provider = %provider,
        "User authenticated via OAuth"
    );

    Ok(Json(serde_json::json!({
        "user": user,
        "accessToken": pair.access_token,
        "refreshToken": pair.refresh_token,
    })))
}
