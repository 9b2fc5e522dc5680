use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Flat comment row with author and reaction counts joined in
#[derive(Debug, Clone, FromRow)]
pub struct CommentRow {
    pub id: String,
    pub post_id: String,
    pub author_id: String,
    pub parent_id: Option<String>,
    pub body: String,
    pub is_edited: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub author_username: String,
    pub author_avatar: Option<String>,
    pub total_likes: i64,
    pub total_dislikes: i64,
}

#[derive(Debug, Serialize)]
pub struct CommentAuthor {
    pub id: String,
    pub username: String,
    pub avatar: Option<String>,
}

/// Threaded comment as served by the API; replies nest recursively
#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: String,
    pub post_id: String,
    pub parent_id: Option<String>,
    pub body: String,
    pub is_edited: bool,
    pub author: CommentAuthor,
    pub total_likes: i64,
    pub total_dislikes: i64,
    pub replies: Vec<CommentResponse>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl CommentResponse {
    pub fn from_row(row: CommentRow, replies: Vec<CommentResponse>) -> Self {
        Self {
            id: row.id,
            post_id: row.post_id,
            parent_id: row.parent_id,
            body: row.body,
            is_edited: row.is_edited,
            author: CommentAuthor {
                id: row.author_id,
                username: row.author_username,
                avatar: row.author_avatar,
            },
            total_likes: row.total_likes,
            total_dislikes: row.total_dislikes,
            replies,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Assemble flat rows (ordered oldest first) into a reply tree.
pub fn build_tree(rows: Vec<CommentRow>) -> Vec<CommentResponse> {
    fn collect(parent: Option<&str>, rows: &mut Vec<Option<CommentRow>>) -> Vec<CommentResponse> {
        let mut out = Vec::new();
        for i in 0..rows.len() {
            let is_child = rows[i]
                .as_ref()
                .map(|r| r.parent_id.as_deref() == parent)
                .unwrap_or(false);
            if is_child {
                if let Some(row) = rows[i].take() {
                    let id = row.id.clone();
                    let replies = collect(Some(&id), rows);
                    out.push(CommentResponse::from_row(row, replies));
                }
            }
        }
        out
    }

    let mut slots: Vec<Option<CommentRow>> = rows.into_iter().map(Some).collect();
    collect(None, &mut slots)
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub body: String,
    pub parent_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCommentRequest {
    pub body: String,
}
