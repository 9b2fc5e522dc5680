use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Post statuses
pub const STATUS_DRAFT: &str = "draft";
pub const STATUS_PUBLISHED: &str = "published";
pub const STATUS_ARCHIVED: &str = "archived";

pub fn is_valid_status(status: &str) -> bool {
    matches!(status, STATUS_DRAFT | STATUS_PUBLISHED | STATUS_ARCHIVED)
}

/// Joined post row as returned by the list/detail queries:
/// post columns plus author, category and engagement counts
#[derive(Debug, Clone, FromRow)]
pub struct PostRow {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub cover_image: Option<String>,
    pub category_id: Option<String>,
    pub status: String,
    pub views_count: i64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub author_username: String,
    pub author_avatar: Option<String>,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
    pub total_likes: i64,
    pub total_dislikes: i64,
    pub total_comments: i64,
    pub total_shares: i64,
}

#[derive(Debug, Serialize)]
pub struct PostAuthor {
    pub id: String,
    pub username: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PostCategory {
    pub name: String,
    pub slug: String,
}

/// API representation of a post
#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub cover_image: Option<String>,
    pub status: String,
    pub views_count: i64,
    pub author: PostAuthor,
    pub category: Option<PostCategory>,
    pub tags: Vec<Tag>,
    pub total_likes: i64,
    pub total_dislikes: i64,
    pub total_comments: i64,
    pub total_shares: i64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl PostResponse {
    pub fn from_row(row: PostRow, tags: Vec<Tag>) -> Self {
        let category = match (row.category_name, row.category_slug) {
            (Some(name), Some(slug)) => Some(PostCategory { name, slug }),
            _ => None,
        };

        Self {
            id: row.id,
            title: row.title,
            slug: row.slug,
            content: row.content,
            cover_image: row.cover_image,
            status: row.status,
            views_count: row.views_count,
            author: PostAuthor {
                id: row.author_id,
                username: row.author_username,
                avatar: row.author_avatar,
            },
            category,
            tags,
            total_likes: row.total_likes,
            total_dislikes: row.total_dislikes,
            total_comments: row.total_comments,
            total_shares: row.total_shares,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostListResponse {
    pub posts: Vec<PostResponse>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub cover_image: Option<String>,
    /// Category slug
    pub category: Option<String>,
    /// Tag slugs; the tags must already exist
    pub tags: Option<Vec<String>>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub cover_image: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PostQueryParams {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub status: Option<String>,
    pub author: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
