// Application state shared across all modules

use reqwest::Client;
use sqlx::SqlitePool;

use crate::auth::oauth::OAuthConfig;
use crate::auth::token::TokenIssuer;

/// Application state containing database pool, HTTP client, and auth configuration
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub http: Client,
    pub tokens: TokenIssuer,
    pub oauth: OAuthConfig,
}
