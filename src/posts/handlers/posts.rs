// src/posts/handlers/posts.rs

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Json,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::auth::{AuthedUser, MaybeAuthedUser};
use crate::common::{generate_post_id, generate_raw_id, slugify, ApiError, AppState, Validator};
use crate::posts::models::*;

/// Base query joining author, category and engagement counts
const POST_SELECT: &str = r#"
    SELECT
        p.id, p.author_id, p.title, p.slug, p.content, p.cover_image,
        p.category_id, p.status, p.views_count, p.created_at, p.updated_at,
        u.username AS author_username, u.avatar AS author_avatar,
        c.name AS category_name, c.slug AS category_slug,
        (SELECT COUNT(*) FROM reactions r WHERE r.post_id = p.id AND r.reaction_type = 'like') AS total_likes,
        (SELECT COUNT(*) FROM reactions r WHERE r.post_id = p.id AND r.reaction_type = 'dislike') AS total_dislikes,
        (SELECT COUNT(*) FROM comments m WHERE m.post_id = p.id) AS total_comments,
        (SELECT COUNT(*) FROM shares s WHERE s.post_id = p.id) AS total_shares
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN categories c ON c.id = p.category_id
"#;

/// Drafts and archived posts are visible to admins and authors; everyone
/// else only sees published posts.
fn can_view_unpublished(viewer: &Option<AuthedUser>) -> bool {
    viewer
        .as_ref()
        .map(|u| u.role == "admin" || u.role == "author")
        .unwrap_or(false)
}

fn is_owner_or_admin(authed: &AuthedUser, author_id: &str) -> bool {
    authed.id == author_id || authed.is_admin()
}

async fn load_tags(pool: &SqlitePool, post_id: &str) -> Result<Vec<Tag>, ApiError> {
    sqlx::query_as::<_, Tag>(
        r#"
        SELECT t.id, t.name, t.slug FROM tags t
        JOIN post_tags pt ON pt.tag_id = t.id
        WHERE pt.post_id = ?
        ORDER BY t.name
        "#,
    )
    .bind(post_id)
    .fetch_all(pool)
    .await
    .map_err(ApiError::DatabaseError)
}

async fn fetch_post_row(pool: &SqlitePool, slug: &str) -> Result<Option<PostRow>, ApiError> {
    sqlx::query_as::<_, PostRow>(&format!("{} WHERE p.slug = ?", POST_SELECT))
        .bind(slug)
        .fetch_optional(pool)
        .await
        .map_err(ApiError::DatabaseError)
}

async fn build_response(pool: &SqlitePool, row: PostRow) -> Result<PostResponse, ApiError> {
    let tags = load_tags(pool, &row.id).await?;
    Ok(PostResponse::from_row(row, tags))
}

/// Resolve a category slug to its id; None clears the category
async fn resolve_category(
    pool: &SqlitePool,
    slug: Option<&str>,
) -> Result<Option<String>, ApiError> {
    match slug {
        None => Ok(None),
        Some(s) => {
            let id: Option<(String,)> = sqlx::query_as("SELECT id FROM categories WHERE slug = ?")
                .bind(s)
                .fetch_optional(pool)
                .await
                .map_err(ApiError::DatabaseError)?;
            id.map(|(id,)| Some(id))
                .ok_or_else(|| ApiError::BadRequest(format!("unknown category '{}'", s)))
        }
    }
}

/// Replace a post's tag set; every slug must name an existing tag
async fn set_post_tags(
    pool: &SqlitePool,
    post_id: &str,
    slugs: &[String],
) -> Result<(), ApiError> {
    let mut tag_ids = Vec::with_capacity(slugs.len());
    for slug in slugs {
        let id: Option<(String,)> = sqlx::query_as("SELECT id FROM tags WHERE slug = ?")
            .bind(slug)
            .fetch_optional(pool)
            .await
            .map_err(ApiError::DatabaseError)?;
        let (id,) = id.ok_or_else(|| ApiError::BadRequest(format!("unknown tag '{}'", slug)))?;
        tag_ids.push(id);
    }

    sqlx::query("DELETE FROM post_tags WHERE post_id = ?")
        .bind(post_id)
        .execute(pool)
        .await
        .map_err(ApiError::DatabaseError)?;

    for tag_id in tag_ids {
        sqlx::query("INSERT OR IGNORE INTO post_tags (post_id, tag_id) VALUES (?, ?)")
            .bind(post_id)
            .bind(&tag_id)
            .execute(pool)
            .await
            .map_err(ApiError::DatabaseError)?;
    }

    Ok(())
}

/// Allocate a unique slug for a title, suffixing on collision
async fn allocate_slug(pool: &SqlitePool, title: &str) -> Result<String, ApiError> {
    let base = {
        let s = slugify(title);
        if s.is_empty() {
            "post".to_string()
        } else {
            s
        }
    };

    let taken: Option<(String,)> = sqlx::query_as("SELECT id FROM posts WHERE slug = ?")
        .bind(&base)
        .fetch_optional(pool)
        .await
        .map_err(ApiError::DatabaseError)?;

    if taken.is_none() {
        Ok(base)
    } else {
        Ok(format!("{}-{}", base, generate_raw_id(4).to_lowercase()))
    }
}

/// GET /api/posts - List posts with filters and pagination
pub async fn list_posts(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    MaybeAuthedUser(viewer): MaybeAuthedUser,
    Query(params): Query<PostQueryParams>,
) -> Result<Json<PostListResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * limit;

    // Viewers and anonymous readers are pinned to published posts no matter
    // what status filter they pass.
    let status_filter = if can_view_unpublished(&viewer) {
        params.status.clone()
    } else {
        Some(STATUS_PUBLISHED.to_string())
    };

    let where_clause = r#"
        WHERE (? IS NULL OR p.status = ?)
          AND (? IS NULL OR c.slug = ?)
          AND (? IS NULL OR u.username = ?)
          AND (? IS NULL OR p.title LIKE '%' || ? || '%' OR p.content LIKE '%' || ? || '%')
          AND (? IS NULL OR EXISTS (
                SELECT 1 FROM post_tags pt
                JOIN tags t ON t.id = pt.tag_id
                WHERE pt.post_id = p.id AND t.slug = ?
          ))
    "#;

    let count_sql = format!(
        "SELECT COUNT(*) FROM posts p JOIN users u ON u.id = p.author_id \
         LEFT JOIN categories c ON c.id = p.category_id {}",
        where_clause
    );
    let total: i64 = sqlx::query_scalar(&count_sql)
        .bind(&status_filter)
        .bind(&status_filter)
        .bind(&params.category)
        .bind(&params.category)
        .bind(&params.author)
        .bind(&params.author)
        .bind(&params.search)
        .bind(&params.search)
        .bind(&params.search)
        .bind(&params.tag)
        .bind(&params.tag)
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let list_sql = format!(
        "{} {} ORDER BY p.created_at DESC LIMIT ? OFFSET ?",
        POST_SELECT, where_clause
    );
    let rows = sqlx::query_as::<_, PostRow>(&list_sql)
        .bind(&status_filter)
        .bind(&status_filter)
        .bind(&params.category)
        .bind(&params.category)
        .bind(&params.author)
        .bind(&params.author)
        .bind(&params.search)
        .bind(&params.search)
        .bind(&params.search)
        .bind(&params.tag)
        .bind(&params.tag)
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let mut posts = Vec::with_capacity(rows.len());
    for row in rows {
        posts.push(build_response(&state.db, row).await?);
    }

    debug!(
        post_count = posts.len(),
        total = total,
        page = page,
        "Loaded paginated post list"
    );

    Ok(Json(PostListResponse {
        posts,
        total: total as usize,
        page,
        page_size: limit,
    }))
}

/// GET /api/posts/:slug - Post detail; increments the view counter
pub async fn get_post(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    MaybeAuthedUser(viewer): MaybeAuthedUser,
    Path(slug): Path<String>,
) -> Result<Json<PostResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let row = fetch_post_row(&state.db, &slug)
        .await?
        .ok_or_else(|| ApiError::NotFound("post not found".to_string()))?;

    if row.status != STATUS_PUBLISHED && !can_view_unpublished(&viewer) {
        // Hidden posts look like missing posts to readers without access.
        return Err(ApiError::NotFound("post not found".to_string()));
    }

    sqlx::query("UPDATE posts SET views_count = views_count + 1 WHERE id = ?")
        .bind(&row.id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let mut response = build_response(&state.db, row).await?;
    response.views_count += 1;

    Ok(Json(response))
}

/// POST /api/posts - Create a post authored by the caller
pub async fn create_post(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    let state = state_lock.read().await.clone();

    let validation = payload.validate(&payload);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let id = generate_post_id();
    let slug = allocate_slug(&state.db, &payload.title).await?;
    let category_id = resolve_category(&state.db, payload.category.as_deref()).await?;
    let status = payload.status.as_deref().unwrap_or(STATUS_DRAFT);

    sqlx::query(
        r#"
        INSERT INTO posts (id, author_id, title, slug, content, cover_image, category_id, status)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&authed.id)
    .bind(payload.title.trim())
    .bind(&slug)
    .bind(&payload.content)
    .bind(payload.cover_image.as_deref())
    .bind(&category_id)
    .bind(status)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    if let Some(tags) = &payload.tags {
        set_post_tags(&state.db, &id, tags).await?;
    }

    let row = fetch_post_row(&state.db, &slug)
        .await?
        .ok_or_else(|| ApiError::InternalServer("post vanished after insert".to_string()))?;
    let response = build_response(&state.db, row).await?;

    info!(post_id = %id, author_id = %authed.id, slug = %slug, "Post created");

    Ok((StatusCode::CREATED, Json(response)))
}

/// PUT /api/posts/:slug - Update a post (owner or admin)
pub async fn update_post(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(slug): Path<String>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<Json<PostResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let validation = payload.validate(&payload);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let row = fetch_post_row(&state.db, &slug)
        .await?
        .ok_or_else(|| ApiError::NotFound("post not found".to_string()))?;

    if !is_owner_or_admin(&authed, &row.author_id) {
        return Err(ApiError::Forbidden(
            "only the author may edit this post".to_string(),
        ));
    }

    let category_id = match payload.category.as_deref() {
        Some(slug) => resolve_category(&state.db, Some(slug)).await?,
        None => row.category_id.clone(),
    };

    sqlx::query(
        r#"
        UPDATE posts SET
            title = COALESCE(?, title),
            content = COALESCE(?, content),
            cover_image = COALESCE(?, cover_image),
            category_id = ?,
            status = COALESCE(?, status),
            updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(payload.title.as_deref().map(str::trim))
    .bind(payload.content.as_deref())
    .bind(payload.cover_image.as_deref())
    .bind(&category_id)
    .bind(payload.status.as_deref())
    .bind(&row.id)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    if let Some(tags) = &payload.tags {
        set_post_tags(&state.db, &row.id, tags).await?;
    }

    let updated = fetch_post_row(&state.db, &slug)
        .await?
        .ok_or_else(|| ApiError::InternalServer("post vanished after update".to_string()))?;
    let response = build_response(&state.db, updated).await?;

    info!(post_id = %row.id, user_id = %authed.id, "Post updated");

    Ok(Json(response))
}

/// DELETE /api/posts/:slug - Delete a post (owner or admin)
pub async fn delete_post(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(slug): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let row = fetch_post_row(&state.db, &slug)
        .await?
        .ok_or_else(|| ApiError::NotFound("post not found".to_string()))?;

    if !is_owner_or_admin(&authed, &row.author_id) {
        return Err(ApiError::Forbidden(
            "only the author may delete this post".to_string(),
        ));
    }

    sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(&row.id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    info!(post_id = %row.id, user_id = %authed.id, "Post deleted");

    Ok(Json(MessageResponse {
        message: "Post deleted.".to_string(),
    }))
}

/// GET /api/posts/mine - The caller's own posts, any status
pub async fn my_posts(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<Vec<PostResponse>>, ApiError> {
    let state = state_lock.read().await.clone();

    let rows = sqlx::query_as::<_, PostRow>(&format!(
        "{} WHERE p.author_id = ? ORDER BY p.created_at DESC",
        POST_SELECT
    ))
    .bind(&authed.id)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    let mut posts = Vec::with_capacity(rows.len());
    for row in rows {
        posts.push(build_response(&state.db, row).await?);
    }

    Ok(Json(posts))
}

/// POST /api/posts/:slug/publish - Publish a draft (owner or admin)
pub async fn publish_post(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(slug): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    set_status(state_lock, authed, &slug, STATUS_PUBLISHED, "Post published successfully.").await
}

/// POST /api/posts/:slug/archive - Archive a post (owner or admin)
pub async fn archive_post(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(slug): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    set_status(state_lock, authed, &slug, STATUS_ARCHIVED, "Post archived.").await
}

async fn set_status(
    state_lock: Arc<RwLock<AppState>>,
    authed: AuthedUser,
    slug: &str,
    status: &str,
    message: &str,
) -> Result<Json<MessageResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let row = fetch_post_row(&state.db, slug)
        .await?
        .ok_or_else(|| ApiError::NotFound("post not found".to_string()))?;

    if !is_owner_or_admin(&authed, &row.author_id) {
        return Err(ApiError::Forbidden("not allowed".to_string()));
    }

    sqlx::query("UPDATE posts SET status = ?, updated_at = datetime('now') WHERE id = ?")
        .bind(status)
        .bind(&row.id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    info!(post_id = %row.id, user_id = %authed.id, status = status, "Post status changed");

    Ok(Json(MessageResponse {
        message: message.to_string(),
    }))
}
