//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /auth/register` - Create an account, returns tokens
/// - `POST /auth/login` - Email/password login, returns tokens
/// - `POST /auth/refresh` - Mint a new access token from a refresh token
/// - `POST /auth/logout` - Revoke a refresh token
/// - `GET /auth/oauth/:provider/redirect` - Start an OAuth flow
/// - `GET /auth/oauth/:provider/callback` - Provider callback, returns tokens
pub fn auth_routes() -> Router {
    Router::new()
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route("/auth/refresh", post(handlers::refresh))
        .route("/auth/logout", post(handlers::logout))
        .route("/auth/oauth/:provider/redirect", get(handlers::oauth_redirect))
        .route("/auth/oauth/:provider/callback", get(handlers::oauth_callback))
}
