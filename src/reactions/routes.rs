// src/reactions/routes.rs

use axum::{
    routing::{delete, get, post},
    Router,
};

use super::handlers;

pub fn reactions_routes() -> Router {
    Router::new()
        .route("/api/reactions", get(handlers::list_reactions))
        .route("/api/reactions/:id", delete(handlers::delete_reaction))
        .route("/api/posts/:slug/reactions", post(handlers::react_to_post))
        .route(
            "/api/comments/:id/reactions",
            post(handlers::react_to_comment),
        )
        .route("/api/posts/:slug/share", post(handlers::share_post))
        .route("/api/posts/:slug/shares", get(handlers::share_summary))
}
