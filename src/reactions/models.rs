use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Reaction types
pub const REACTION_LIKE: &str = "like";
pub const REACTION_DISLIKE: &str = "dislike";

pub fn is_valid_reaction(kind: &str) -> bool {
    matches!(kind, REACTION_LIKE | REACTION_DISLIKE)
}

/// Share platforms tracked in the breakdown
pub const SHARE_PLATFORMS: &[&str] = &["twitter", "facebook", "linkedin", "whatsapp", "email", "other"];

pub fn is_valid_platform(platform: &str) -> bool {
    SHARE_PLATFORMS.contains(&platform)
}

#[derive(Debug, Deserialize)]
pub struct ReactRequest {
    pub reaction_type: String,
}

/// Reaction row as served by the list endpoint
#[derive(Debug, Serialize, FromRow)]
pub struct Reaction {
    pub id: String,
    pub user_id: String,
    pub post_id: Option<String>,
    pub comment_id: Option<String>,
    pub reaction_type: String,
    pub created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReactionQueryParams {
    /// Post id filter
    pub post: Option<String>,
    /// Comment id filter
    pub comment: Option<String>,
    #[serde(rename = "type")]
    pub reaction_type: Option<String>,
}

/// Outcome of a toggle: the caller's current reaction plus fresh counts
#[derive(Debug, Serialize)]
pub struct ReactionStatus {
    /// The caller's reaction after the toggle, if any
    pub reaction_type: Option<String>,
    pub total_likes: i64,
    pub total_dislikes: i64,
}

#[derive(Debug, Deserialize)]
pub struct ShareRequest {
    pub platform: Option<String>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct PlatformCount {
    pub platform: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct ShareSummary {
    pub total: i64,
    pub breakdown: Vec<PlatformCount>,
}
