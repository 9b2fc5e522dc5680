// src/notifications/routes.rs

use axum::{
    routing::{get, patch},
    Router,
};

use super::handlers;

pub fn notifications_routes() -> Router {
    Router::new()
        .route(
            "/api/notifications",
            get(handlers::list_notifications).delete(handlers::clear_notifications),
        )
        .route(
            "/api/notifications/unread-count",
            get(handlers::get_unread_count),
        )
        .route("/api/notifications/:id/read", patch(handlers::mark_read))
        .route(
            "/api/notifications/read-all",
            patch(handlers::mark_all_read),
        )
}
