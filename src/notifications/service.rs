//! Notification fan-out used by the comment and reaction handlers.

use sqlx::SqlitePool;
use tracing::debug;

use crate::common::{generate_notification_id, ApiError};

/// Record a notification for `recipient_id` about something `sender_id` did.
///
/// Self-notifications are silently dropped so reacting to or commenting on
/// your own post never pings you.
pub async fn notify(
    pool: &SqlitePool,
    recipient_id: &str,
    sender_id: &str,
    notif_type: &str,
    post_id: Option<&str>,
    comment_id: Option<&str>,
) -> Result<(), ApiError> {
    if recipient_id == sender_id {
        return Ok(());
    }

    let id = generate_notification_id();
    sqlx::query(
        r#"
        INSERT INTO notifications (id, recipient_id, sender_id, notif_type, post_id, comment_id)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(recipient_id)
    .bind(sender_id)
    .bind(notif_type)
    .bind(post_id)
    .bind(comment_id)
    .execute(pool)
    .await
    .map_err(ApiError::DatabaseError)?;

    debug!(
        notification_id = %id,
        recipient_id = %recipient_id,
        notif_type = notif_type,
        "Notification created"
    );

    Ok(())
}
