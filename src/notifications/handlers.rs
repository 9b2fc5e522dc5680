// src/notifications/handlers.rs

use axum::{
    extract::{Extension, Path, Query},
    response::Json,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::auth::AuthedUser;
use crate::common::{ApiError, AppState};
use crate::notifications::models::{
    Notification, NotificationListResponse, NotificationQueryParams, UnreadCountResponse,
};
use crate::posts::models::MessageResponse;

async fn unread_count(pool: &SqlitePool, user_id: &str) -> Result<i64, ApiError> {
    sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE recipient_id = ? AND is_read = 0")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .map_err(ApiError::DatabaseError)
}

/// GET /api/notifications - The caller's notifications, newest first;
/// `?unread=true` narrows to unread rows
pub async fn list_notifications(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Query(params): Query<NotificationQueryParams>,
) -> Result<Json<NotificationListResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let unread_only = params.unread.unwrap_or(false);

    let results = sqlx::query_as::<_, Notification>(
        r#"
        SELECT
            n.id, n.recipient_id, n.sender_id, u.username AS sender_username,
            n.notif_type, n.post_id, p.slug AS post_slug, n.comment_id,
            n.is_read, n.created_at
        FROM notifications n
        JOIN users u ON u.id = n.sender_id
        LEFT JOIN posts p ON p.id = n.post_id
        WHERE n.recipient_id = ?
          AND (? = 0 OR n.is_read = 0)
        ORDER BY n.created_at DESC
        LIMIT 100
        "#,
    )
    .bind(&authed.id)
    .bind(unread_only)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    let unread = unread_count(&state.db, &authed.id).await?;

    Ok(Json(NotificationListResponse {
        count: results.len(),
        unread_count: unread,
        results,
    }))
}

/// GET /api/notifications/unread-count
pub async fn get_unread_count(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<UnreadCountResponse>, ApiError> {
    let state = state_lock.read().await.clone();
    let unread = unread_count(&state.db, &authed.id).await?;

    Ok(Json(UnreadCountResponse {
        unread_count: unread,
    }))
}

/// PATCH /api/notifications/:id/read - Mark one notification read
pub async fn mark_read(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    // Scoping the update to the caller prevents marking other users' rows.
    let result =
        sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = ? AND recipient_id = ?")
            .bind(&id)
            .bind(&authed.id)
            .execute(&state.db)
            .await
            .map_err(ApiError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("notification not found".to_string()));
    }

    Ok(Json(MessageResponse {
        message: "Notification marked as read.".to_string(),
    }))
}

/// PATCH /api/notifications/read-all - Mark everything read
pub async fn mark_all_read(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<MessageResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let result =
        sqlx::query("UPDATE notifications SET is_read = 1 WHERE recipient_id = ? AND is_read = 0")
            .bind(&authed.id)
            .execute(&state.db)
            .await
            .map_err(ApiError::DatabaseError)?;

    info!(
        user_id = %authed.id,
        marked = result.rows_affected(),
        "Marked all notifications read"
    );

    Ok(Json(MessageResponse {
        message: "All notifications marked as read.".to_string(),
    }))
}

/// DELETE /api/notifications - Clear the caller's notifications
pub async fn clear_notifications(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<MessageResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let result = sqlx::query("DELETE FROM notifications WHERE recipient_id = ?")
        .bind(&authed.id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    info!(
        user_id = %authed.id,
        deleted = result.rows_affected(),
        "Cleared notifications"
    );

    Ok(Json(MessageResponse {
        message: "Notifications cleared.".to_string(),
    }))
}
