// src/users/handlers.rs

use axum::extract::{Extension, Json, Path};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::models::{ChangePasswordRequest, PublicUser, UpdateProfileRequest};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::{store, AuthedUser, User};
use crate::common::{ApiError, AppState, Validator};

/// GET /api/users/profile - Get the logged in user's own profile
pub async fn get_profile(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<User>, ApiError> {
    let state = state_lock.read().await.clone();

    let user = store::find_by_id(&state.db, &authed.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;

    Ok(Json(user))
}

/// PATCH /api/users/profile - Update the logged in user's own profile
pub async fn update_profile(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<User>, ApiError> {
    let state = state_lock.read().await.clone();

    let validation = payload.validate(&payload);
    if !validation.is_valid {
        return Err(validation.into());
    }

    if let Some(username) = payload.username.as_deref().map(str::trim) {
        if let Some(other) = store::find_by_username(&state.db, username).await? {
            if other.id != authed.id {
                return Err(ApiError::ValidationError(
                    "username: already taken".to_string(),
                ));
            }
        }
    }

    sqlx::query(
        r#"
        UPDATE users SET
            username = COALESCE(?, username),
            bio = COALESCE(?, bio),
            avatar = COALESCE(?, avatar),
            updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(payload.username.as_deref().map(str::trim))
    .bind(payload.bio.as_deref())
    .bind(payload.avatar.as_deref())
    .bind(&authed.id)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    let user = store::find_by_id(&state.db, &authed.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;

    info!(user_id = %authed.id, "Profile updated");

    Ok(Json(user))
}

/// GET /api/users/:username - Get any user's public profile
pub async fn get_public_profile(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path(username): Path<String>,
) -> Result<Json<PublicUser>, ApiError> {
    let state = state_lock.read().await.clone();

    let user = sqlx::query_as::<_, PublicUser>(
        "SELECT id, username, avatar, role FROM users WHERE username = ? AND disabled = 0",
    )
    .bind(&username)
    .fetch_optional(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?
    .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;

    Ok(Json(user))
}

/// POST /api/users/profile/change-password - Change the caller's password
pub async fn change_password(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let validation = payload.validate(&payload);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let user = store::find_by_id(&state.db, &authed.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;

    let current_hash = user.password_hash.as_deref().ok_or_else(|| {
        ApiError::BadRequest("password login is not enabled for this account".to_string())
    })?;

    if !verify_password(current_hash, &payload.old_password) {
        warn!(user_id = %authed.id, "Change password rejected: old password mismatch");
        return Err(ApiError::BadRequest("old password is incorrect".to_string()));
    }

    let new_hash = hash_password(&payload.new_password)?;
    sqlx::query("UPDATE users SET password_hash = ?, updated_at = datetime('now') WHERE id = ?")
        .bind(&new_hash)
        .bind(&authed.id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    info!(user_id = %authed.id, "Password changed");

    Ok(Json(serde_json::json!({ "message": "Password changed successfully." })))
}

/// GET /api/users - Admin only, list all users newest first
pub async fn list_users(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<Vec<User>>, ApiError> {
    if !authed.is_admin() {
        return Err(ApiError::Forbidden("admin access required".to_string()));
    }

    let state = state_lock.read().await.clone();

    let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC")
        .fetch_all(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    Ok(Json(users))
}
