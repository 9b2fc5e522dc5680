// src/posts/routes.rs

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use super::handlers;

pub fn posts_routes() -> Router {
    Router::new()
        .route(
            "/api/posts",
            get(handlers::list_posts).post(handlers::create_post),
        )
        .route("/api/posts/mine", get(handlers::my_posts))
        .route(
            "/api/posts/:slug",
            get(handlers::get_post)
                .put(handlers::update_post)
                .delete(handlers::delete_post),
        )
        .route("/api/posts/:slug/publish", post(handlers::publish_post))
        .route("/api/posts/:slug/archive", post(handlers::archive_post))
        .route(
            "/api/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/api/categories/:slug",
            put(handlers::update_category).delete(handlers::delete_category),
        )
        .route(
            "/api/tags",
            get(handlers::list_tags).post(handlers::create_tag),
        )
        .route("/api/tags/:slug", delete(handlers::delete_tag))
}
