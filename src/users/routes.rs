use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates the users router with profile and admin routes
pub fn users_routes() -> Router {
    Router::new()
        .route(
            "/api/users/profile",
            get(handlers::get_profile).patch(handlers::update_profile),
        )
        .route(
            "/api/users/profile/change-password",
            post(handlers::change_password),
        )
        .route("/api/users/:username", get(handlers::get_public_profile))
        .route("/api/users", get(handlers::list_users))
}
