// src/posts/handlers/categories.rs

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::auth::AuthedUser;
use crate::common::{generate_category_id, slugify, ApiError, AppState, Validator};
use crate::posts::models::{Category, CreateCategoryRequest, MessageResponse, UpdateCategoryRequest};

/// GET /api/categories - All categories, public
pub async fn list_categories(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Result<Json<Vec<Category>>, ApiError> {
    let state = state_lock.read().await.clone();

    let categories = sqlx::query_as::<_, Category>(
        "SELECT id, name, slug, description, created_at FROM categories ORDER BY name",
    )
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    Ok(Json(categories))
}

/// POST /api/categories - Create a category (admin only)
pub async fn create_category(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let state = state_lock.read().await.clone();

    if !authed.is_admin() {
        return Err(ApiError::Forbidden(
            "only admins may manage categories".to_string(),
        ));
    }

    let validation = payload.validate(&payload);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let id = generate_category_id();
    let slug = slugify(&payload.name);

    sqlx::query("INSERT INTO categories (id, name, slug, description) VALUES (?, ?, ?, ?)")
        .bind(&id)
        .bind(payload.name.trim())
        .bind(&slug)
        .bind(payload.description.as_deref().unwrap_or(""))
        .execute(&state.db)
        .await
        .map_err(|e| {
            if matches!(&e, sqlx::Error::Database(d) if d.message().contains("UNIQUE")) {
                ApiError::BadRequest("category already exists".to_string())
            } else {
                ApiError::DatabaseError(e)
            }
        })?;

    let category = sqlx::query_as::<_, Category>(
        "SELECT id, name, slug, description, created_at FROM categories WHERE id = ?",
    )
    .bind(&id)
    .fetch_one(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    info!(category_id = %id, slug = %slug, "Category created");

    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/categories/:slug - Update a category (admin only)
pub async fn update_category(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(slug): Path<String>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> Result<Json<Category>, ApiError> {
    let state = state_lock.read().await.clone();

    if !authed.is_admin() {
        return Err(ApiError::Forbidden(
            "only admins may manage categories".to_string(),
        ));
    }

    let existing = sqlx::query_as::<_, Category>(
        "SELECT id, name, slug, description, created_at FROM categories WHERE slug = ?",
    )
    .bind(&slug)
    .fetch_optional(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?
    .ok_or_else(|| ApiError::NotFound("category not found".to_string()))?;

    // Renaming keeps the slug stable so existing post URLs stay valid
    sqlx::query(
        "UPDATE categories SET name = COALESCE(?, name), description = COALESCE(?, description) WHERE id = ?",
    )
    .bind(payload.name.as_deref().map(str::trim))
    .bind(payload.description.as_deref())
    .bind(&existing.id)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    let category = sqlx::query_as::<_, Category>(
        "SELECT id, name, slug, description, created_at FROM categories WHERE id = ?",
    )
    .bind(&existing.id)
    .fetch_one(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    Ok(Json(category))
}

/// DELETE /api/categories/:slug - Delete a category (admin only)
pub async fn delete_category(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(slug): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    if !authed.is_admin() {
        return Err(ApiError::Forbidden(
            "only admins may manage categories".to_string(),
        ));
    }

    let result = sqlx::query("DELETE FROM categories WHERE slug = ?")
        .bind(&slug)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("category not found".to_string()));
    }

    info!(slug = %slug, "Category deleted");

    Ok(Json(MessageResponse {
        message: "Category deleted.".to_string(),
    }))
}
