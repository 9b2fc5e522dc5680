// src/comments/routes.rs

use axum::{
    routing::{get, put},
    Router,
};

use super::handlers;

pub fn comments_routes() -> Router {
    Router::new()
        .route(
            "/api/posts/:slug/comments",
            get(handlers::list_comments).post(handlers::create_comment),
        )
        .route(
            "/api/comments/:id",
            put(handlers::update_comment).delete(handlers::delete_comment),
        )
}
