// src/reactions/handlers.rs

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Json,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::auth::AuthedUser;
use crate::common::{generate_reaction_id, generate_share_id, ApiError, AppState};
use crate::notifications::models::NOTIF_REACTION;
use crate::notifications::service::notify;
use crate::posts::models::{MessageResponse, STATUS_PUBLISHED};
use crate::reactions::models::*;

/// The two places a reaction can land
pub(crate) enum Target {
    Post(String),
    Comment(String),
}

impl Target {
    fn column(&self) -> &'static str {
        match self {
            Target::Post(_) => "post_id",
            Target::Comment(_) => "comment_id",
        }
    }

    fn id(&self) -> &str {
        match self {
            Target::Post(id) => id,
            Target::Comment(id) => id,
        }
    }
}

async fn find_published_post(
    pool: &SqlitePool,
    slug: &str,
) -> Result<(String, String), ApiError> {
    let row: Option<(String, String, String)> =
        sqlx::query_as("SELECT id, author_id, status FROM posts WHERE slug = ?")
            .bind(slug)
            .fetch_optional(pool)
            .await
            .map_err(ApiError::DatabaseError)?;

    match row {
        Some((id, author_id, status)) if status == STATUS_PUBLISHED => Ok((id, author_id)),
        _ => Err(ApiError::NotFound("post not found".to_string())),
    }
}

pub(crate) async fn reaction_counts(pool: &SqlitePool, target: &Target) -> Result<(i64, i64), ApiError> {
    let sql = format!(
        "SELECT \
            COALESCE(SUM(reaction_type = 'like'), 0), \
            COALESCE(SUM(reaction_type = 'dislike'), 0) \
         FROM reactions WHERE {} = ?",
        target.column()
    );
    sqlx::query_as(&sql)
        .bind(target.id())
        .fetch_one(pool)
        .await
        .map_err(ApiError::DatabaseError)
}

/// Toggle a reaction: same type removes it, a different type replaces it.
/// Returns the caller's reaction after the toggle.
pub(crate) async fn toggle(
    pool: &SqlitePool,
    user_id: &str,
    target: &Target,
    kind: &str,
) -> Result<Option<String>, ApiError> {
    let select = format!(
        "SELECT id, reaction_type FROM reactions WHERE user_id = ? AND {} = ?",
        target.column()
    );
    let existing: Option<(String, String)> = sqlx::query_as(&select)
        .bind(user_id)
        .bind(target.id())
        .fetch_optional(pool)
        .await
        .map_err(ApiError::DatabaseError)?;

    match existing {
        Some((id, existing_kind)) if existing_kind == kind => {
            sqlx::query("DELETE FROM reactions WHERE id = ?")
                .bind(&id)
                .execute(pool)
                .await
                .map_err(ApiError::DatabaseError)?;
            Ok(None)
        }
        Some((id, _)) => {
            sqlx::query("UPDATE reactions SET reaction_type = ? WHERE id = ?")
                .bind(kind)
                .bind(&id)
                .execute(pool)
                .await
                .map_err(ApiError::DatabaseError)?;
            Ok(Some(kind.to_string()))
        }
        None => {
            // The unique constraint absorbs a concurrent insert for the same
            // (user, target); flipping to an update keeps the row single.
            let insert = format!(
                "INSERT INTO reactions (id, user_id, {}, reaction_type) VALUES (?, ?, ?, ?) \
                 ON CONFLICT (user_id, {}) DO UPDATE SET reaction_type = excluded.reaction_type",
                target.column(),
                target.column()
            );
            sqlx::query(&insert)
                .bind(generate_reaction_id())
                .bind(user_id)
                .bind(target.id())
                .bind(kind)
                .execute(pool)
                .await
                .map_err(ApiError::DatabaseError)?;
            Ok(Some(kind.to_string()))
        }
    }
}

/// POST /api/posts/:slug/reactions - Like or dislike a post (toggle)
pub async fn react_to_post(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(slug): Path<String>,
    Json(payload): Json<ReactRequest>,
) -> Result<Json<ReactionStatus>, ApiError> {
    let state = state_lock.read().await.clone();

    if !is_valid_reaction(&payload.reaction_type) {
        return Err(ApiError::BadRequest(
            "reaction_type must be 'like' or 'dislike'".to_string(),
        ));
    }

    let (post_id, author_id) = find_published_post(&state.db, &slug).await?;
    let target = Target::Post(post_id.clone());

    let current = toggle(&state.db, &authed.id, &target, &payload.reaction_type).await?;

    // Only a reaction that sticks notifies the author; toggling one off is
    // silent.
    if current.is_some() {
        notify(&state.db, &author_id, &authed.id, NOTIF_REACTION, Some(&post_id), None).await?;
    }

    let (total_likes, total_dislikes) = reaction_counts(&state.db, &target).await?;

    debug!(
        post_id = %post_id,
        user_id = %authed.id,
        reaction = ?current,
        "Post reaction toggled"
    );

    Ok(Json(ReactionStatus {
        reaction_type: current,
        total_likes,
        total_dislikes,
    }))
}

/// POST /api/comments/:id/reactions - Like or dislike a comment (toggle)
pub async fn react_to_comment(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(id): Path<String>,
    Json(payload): Json<ReactRequest>,
) -> Result<Json<ReactionStatus>, ApiError> {
    let state = state_lock.read().await.clone();

    if !is_valid_reaction(&payload.reaction_type) {
        return Err(ApiError::BadRequest(
            "reaction_type must be 'like' or 'dislike'".to_string(),
        ));
    }

    let comment: Option<(String, String)> =
        sqlx::query_as("SELECT id, author_id FROM comments WHERE id = ?")
            .bind(&id)
            .fetch_optional(&state.db)
            .await
            .map_err(ApiError::DatabaseError)?;
    let (comment_id, author_id) =
        comment.ok_or_else(|| ApiError::NotFound("comment not found".to_string()))?;

    let target = Target::Comment(comment_id.clone());
    let current = toggle(&state.db, &authed.id, &target, &payload.reaction_type).await?;

    if current.is_some() {
        notify(&state.db, &author_id, &authed.id, NOTIF_REACTION, None, Some(&comment_id)).await?;
    }

    let (total_likes, total_dislikes) = reaction_counts(&state.db, &target).await?;

    Ok(Json(ReactionStatus {
        reaction_type: current,
        total_likes,
        total_dislikes,
    }))
}

/// GET /api/reactions - List reactions, filterable by post, comment and type
pub async fn list_reactions(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Query(params): Query<ReactionQueryParams>,
) -> Result<Json<Vec<Reaction>>, ApiError> {
    let state = state_lock.read().await.clone();

    let reactions = sqlx::query_as::<_, Reaction>(
        r#"
        SELECT id, user_id, post_id, comment_id, reaction_type, created_at
        FROM reactions
        WHERE (? IS NULL OR post_id = ?)
          AND (? IS NULL OR comment_id = ?)
          AND (? IS NULL OR reaction_type = ?)
        ORDER BY created_at DESC
        "#,
    )
    .bind(&params.post)
    .bind(&params.post)
    .bind(&params.comment)
    .bind(&params.comment)
    .bind(&params.reaction_type)
    .bind(&params.reaction_type)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    Ok(Json(reactions))
}

/// DELETE /api/reactions/:id - Remove a reaction (owner or admin)
pub async fn delete_reaction(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let owner: Option<(String,)> = sqlx::query_as("SELECT user_id FROM reactions WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;
    let (user_id,) = owner.ok_or_else(|| ApiError::NotFound("reaction not found".to_string()))?;

    if user_id != authed.id && !authed.is_admin() {
        return Err(ApiError::Forbidden(
            "only the reacting user may remove this reaction".to_string(),
        ));
    }

    sqlx::query("DELETE FROM reactions WHERE id = ?")
        .bind(&id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    info!(reaction_id = %id, user_id = %authed.id, "Reaction deleted");

    Ok(Json(MessageResponse {
        message: "Reaction deleted.".to_string(),
    }))
}

/// POST /api/posts/:slug/share - Record a share
pub async fn share_post(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(slug): Path<String>,
    Json(payload): Json<ShareRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let state = state_lock.read().await.clone();

    let platform = payload.platform.as_deref().unwrap_or("other");
    if !is_valid_platform(platform) {
        return Err(ApiError::BadRequest(format!(
            "unknown platform '{}'",
            platform
        )));
    }

    let (post_id, _) = find_published_post(&state.db, &slug).await?;

    let id = generate_share_id();
    sqlx::query("INSERT INTO shares (id, user_id, post_id, platform) VALUES (?, ?, ?, ?)")
        .bind(&id)
        .bind(&authed.id)
        .bind(&post_id)
        .bind(platform)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    info!(post_id = %post_id, user_id = %authed.id, platform = platform, "Post shared");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Share recorded.".to_string(),
        }),
    ))
}

/// GET /api/posts/:slug/shares - Share totals with a per-platform breakdown
pub async fn share_summary(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path(slug): Path<String>,
) -> Result<Json<ShareSummary>, ApiError> {
    let state = state_lock.read().await.clone();

    let (post_id, _) = find_published_post(&state.db, &slug).await?;

    let breakdown = sqlx::query_as::<_, PlatformCount>(
        "SELECT platform, COUNT(*) AS count FROM shares WHERE post_id = ? \
         GROUP BY platform ORDER BY count DESC, platform",
    )
    .bind(&post_id)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    let total = breakdown.iter().map(|p| p.count).sum();

    Ok(Json(ShareSummary { total, breakdown }))
}
