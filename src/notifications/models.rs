use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Notification types
pub const NOTIF_COMMENT: &str = "comment";
pub const NOTIF_REPLY: &str = "reply";
pub const NOTIF_REACTION: &str = "reaction";

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: String,
    pub recipient_id: String,
    pub sender_id: String,
    pub sender_username: String,
    pub notif_type: String,
    pub post_id: Option<String>,
    pub post_slug: Option<String>,
    pub comment_id: Option<String>,
    pub is_read: bool,
    pub created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NotificationQueryParams {
    /// `?unread=true` restricts the feed to unread notifications
    pub unread: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct NotificationListResponse {
    pub count: usize,
    pub unread_count: i64,
    pub results: Vec<Notification>,
}

#[derive(Serialize)]
pub struct UnreadCountResponse {
    pub unread_count: i64,
}
