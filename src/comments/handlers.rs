// src/comments/handlers.rs

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Json,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::auth::{AuthedUser, MaybeAuthedUser};
use crate::comments::models::*;
use crate::common::{generate_comment_id, ApiError, AppState, Validator};
use crate::notifications::models::{NOTIF_COMMENT, NOTIF_REPLY};
use crate::notifications::service::notify;
use crate::posts::models::{MessageResponse, STATUS_PUBLISHED};

const COMMENT_SELECT: &str = r#"
    SELECT
        m.id, m.post_id, m.author_id, m.parent_id, m.body, m.is_edited,
        m.created_at, m.updated_at,
        u.username AS author_username, u.avatar AS author_avatar,
        (SELECT COUNT(*) FROM reactions r WHERE r.comment_id = m.id AND r.reaction_type = 'like') AS total_likes,
        (SELECT COUNT(*) FROM reactions r WHERE r.comment_id = m.id AND r.reaction_type = 'dislike') AS total_dislikes
    FROM comments m
    JOIN users u ON u.id = m.author_id
"#;

struct PostRef {
    id: String,
    author_id: String,
    status: String,
}

async fn find_post(pool: &SqlitePool, slug: &str) -> Result<PostRef, ApiError> {
    let row: Option<(String, String, String)> =
        sqlx::query_as("SELECT id, author_id, status FROM posts WHERE slug = ?")
            .bind(slug)
            .fetch_optional(pool)
            .await
            .map_err(ApiError::DatabaseError)?;

    row.map(|(id, author_id, status)| PostRef {
        id,
        author_id,
        status,
    })
    .ok_or_else(|| ApiError::NotFound("post not found".to_string()))
}

fn post_visible(post: &PostRef, viewer: &Option<AuthedUser>) -> bool {
    post.status == STATUS_PUBLISHED
        || viewer
            .as_ref()
            .map(|u| u.role == "admin" || u.role == "author")
            .unwrap_or(false)
}

async fn fetch_comment(pool: &SqlitePool, id: &str) -> Result<CommentRow, ApiError> {
    sqlx::query_as::<_, CommentRow>(&format!("{} WHERE m.id = ?", COMMENT_SELECT))
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound("comment not found".to_string()))
}

/// GET /api/posts/:slug/comments - Threaded comments for a post
pub async fn list_comments(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    MaybeAuthedUser(viewer): MaybeAuthedUser,
    Path(slug): Path<String>,
) -> Result<Json<Vec<CommentResponse>>, ApiError> {
    let state = state_lock.read().await.clone();

    let post = find_post(&state.db, &slug).await?;
    if !post_visible(&post, &viewer) {
        return Err(ApiError::NotFound("post not found".to_string()));
    }

    let rows = sqlx::query_as::<_, CommentRow>(&format!(
        "{} WHERE m.post_id = ? ORDER BY m.created_at ASC, m.id ASC",
        COMMENT_SELECT
    ))
    .bind(&post.id)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    Ok(Json(build_tree(rows)))
}

/// POST /api/posts/:slug/comments - Comment on a post, optionally as a reply
pub async fn create_comment(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(slug): Path<String>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), ApiError> {
    let state = state_lock.read().await.clone();

    let validation = payload.validate(&payload);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let post = find_post(&state.db, &slug).await?;
    if post.status != STATUS_PUBLISHED {
        return Err(ApiError::BadRequest(
            "comments are only allowed on published posts".to_string(),
        ));
    }

    // A reply's parent must live on the same post.
    let parent_author: Option<String> = match &payload.parent_id {
        None => None,
        Some(parent_id) => {
            let parent: Option<(String, String)> =
                sqlx::query_as("SELECT post_id, author_id FROM comments WHERE id = ?")
                    .bind(parent_id)
                    .fetch_optional(&state.db)
                    .await
                    .map_err(ApiError::DatabaseError)?;
            match parent {
                Some((parent_post_id, author_id)) if parent_post_id == post.id => Some(author_id),
                Some(_) => {
                    return Err(ApiError::BadRequest(
                        "parent comment belongs to a different post".to_string(),
                    ))
                }
                None => return Err(ApiError::BadRequest("parent comment not found".to_string())),
            }
        }
    };

    let id = generate_comment_id();
    sqlx::query(
        "INSERT INTO comments (id, post_id, author_id, parent_id, body) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&post.id)
    .bind(&authed.id)
    .bind(payload.parent_id.as_deref())
    .bind(payload.body.trim())
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    // Replies notify the parent comment's author; top-level comments notify
    // the post author.
    match parent_author {
        Some(recipient) => {
            notify(&state.db, &recipient, &authed.id, NOTIF_REPLY, Some(&post.id), Some(&id))
                .await?
        }
        None => {
            notify(&state.db, &post.author_id, &authed.id, NOTIF_COMMENT, Some(&post.id), Some(&id))
                .await?
        }
    }

    let row = fetch_comment(&state.db, &id).await?;

    info!(comment_id = %id, post_id = %post.id, author_id = %authed.id, "Comment created");

    Ok((StatusCode::CREATED, Json(CommentResponse::from_row(row, vec![]))))
}

/// PUT /api/comments/:id - Edit a comment (author or admin)
pub async fn update_comment(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCommentRequest>,
) -> Result<Json<CommentResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let validation = payload.validate(&payload);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let existing = fetch_comment(&state.db, &id).await?;
    if existing.author_id != authed.id && !authed.is_admin() {
        return Err(ApiError::Forbidden(
            "only the author may edit this comment".to_string(),
        ));
    }

    sqlx::query(
        "UPDATE comments SET body = ?, is_edited = 1, updated_at = datetime('now') WHERE id = ?",
    )
    .bind(payload.body.trim())
    .bind(&id)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    let row = fetch_comment(&state.db, &id).await?;

    Ok(Json(CommentResponse::from_row(row, vec![])))
}

/// DELETE /api/comments/:id - Delete a comment (author or admin)
///
/// Replies go with it via the schema's cascade.
pub async fn delete_comment(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let existing = fetch_comment(&state.db, &id).await?;
    if existing.author_id != authed.id && !authed.is_admin() {
        return Err(ApiError::Forbidden(
            "only the author may delete this comment".to_string(),
        ));
    }

    sqlx::query("DELETE FROM comments WHERE id = ?")
        .bind(&id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    info!(comment_id = %id, user_id = %authed.id, "Comment deleted");

    Ok(Json(MessageResponse {
        message: "Comment deleted.".to_string(),
    }))
}
