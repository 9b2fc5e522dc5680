// src/posts/handlers/tags.rs

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::auth::AuthedUser;
use crate::common::{generate_tag_id, slugify, ApiError, AppState, Validator};
use crate::posts::models::{CreateTagRequest, MessageResponse, Tag};

/// GET /api/tags - All tags, public
pub async fn list_tags(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Result<Json<Vec<Tag>>, ApiError> {
    let state = state_lock.read().await.clone();

    let tags = sqlx::query_as::<_, Tag>("SELECT id, name, slug FROM tags ORDER BY name")
        .fetch_all(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    Ok(Json(tags))
}

/// POST /api/tags - Create a tag (admin only)
pub async fn create_tag(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(payload): Json<CreateTagRequest>,
) -> Result<(StatusCode, Json<Tag>), ApiError> {
    let state = state_lock.read().await.clone();

    if !authed.is_admin() {
        return Err(ApiError::Forbidden("only admins may manage tags".to_string()));
    }

    let validation = payload.validate(&payload);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let id = generate_tag_id();
    let slug = slugify(&payload.name);

    sqlx::query("INSERT INTO tags (id, name, slug) VALUES (?, ?, ?)")
        .bind(&id)
        .bind(payload.name.trim())
        .bind(&slug)
        .execute(&state.db)
        .await
        .map_err(|e| {
            if matches!(&e, sqlx::Error::Database(d) if d.message().contains("UNIQUE")) {
                ApiError::BadRequest("tag already exists".to_string())
            } else {
                ApiError::DatabaseError(e)
            }
        })?;

    let tag = sqlx::query_as::<_, Tag>("SELECT id, name, slug FROM tags WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    info!(tag_id = %id, slug = %slug, "Tag created");

    Ok((StatusCode::CREATED, Json(tag)))
}

/// DELETE /api/tags/:slug - Delete a tag (admin only)
pub async fn delete_tag(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(slug): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    if !authed.is_admin() {
        return Err(ApiError::Forbidden("only admins may manage tags".to_string()));
    }

    let result = sqlx::query("DELETE FROM tags WHERE slug = ?")
        .bind(&slug)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("tag not found".to_string()));
    }

    info!(slug = %slug, "Tag deleted");

    Ok(Json(MessageResponse {
        message: "Tag deleted.".to_string(),
    }))
}
