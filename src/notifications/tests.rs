//! Tests for notification fan-out and read-state bookkeeping

#[cfg(test)]
mod tests {
    use axum::extract::{Extension, Query};
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use crate::auth::oauth::OAuthConfig;
    use crate::auth::token::TokenIssuer;
    use crate::auth::AuthedUser;
    use crate::common::{migrations, AppState};
    use crate::notifications::handlers;
    use crate::notifications::models::{
        NotificationQueryParams, NOTIF_COMMENT, NOTIF_REACTION, NOTIF_REPLY,
    };
    use crate::notifications::service::notify;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("failed to open in-memory database");
        migrations::run_migrations(&pool)
            .await
            .expect("migrations failed");
        pool
    }

    async fn seed_user(pool: &SqlitePool, id: &str, username: &str) {
        sqlx::query("INSERT INTO users (id, email, username) VALUES (?, ?, ?)")
            .bind(id)
            .bind(format!("{}@example.com", username))
            .bind(username)
            .execute(pool)
            .await
            .expect("failed to seed user");
    }

    async fn seed_post(pool: &SqlitePool, id: &str, author_id: &str, slug: &str) {
        sqlx::query(
            "INSERT INTO posts (id, author_id, title, slug, content, status) VALUES (?, ?, ?, ?, ?, 'published')",
        )
        .bind(id)
        .bind(author_id)
        .bind(slug)
        .bind(slug)
        .bind("body")
        .execute(pool)
        .await
        .expect("failed to seed post");
    }

    fn state_for(pool: SqlitePool) -> Extension<Arc<RwLock<AppState>>> {
        Extension(Arc::new(RwLock::new(AppState {
            db: pool,
            http: reqwest::Client::new(),
            tokens: TokenIssuer::new("test_secret_key", 60, 7),
            oauth: OAuthConfig {
                google: None,
                github: None,
                redirect_base: "http://localhost:8080".to_string(),
            },
        })))
    }

    fn authed(id: &str, username: &str) -> AuthedUser {
        AuthedUser {
            id: id.to_string(),
            email: format!("{}@example.com", username),
            username: username.to_string(),
            role: "author".to_string(),
        }
    }

    async fn count(pool: &SqlitePool, recipient: &str) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE recipient_id = ?")
            .bind(recipient)
            .fetch_one(pool)
            .await
            .expect("count query failed")
    }

    #[tokio::test]
    async fn test_notify_records_for_recipient() {
        let pool = test_pool().await;
        seed_user(&pool, "U_AUTHOR", "author").await;
        seed_user(&pool, "U_READER", "reader").await;
        seed_post(&pool, "P_ONE", "U_AUTHOR", "hello").await;

        notify(&pool, "U_AUTHOR", "U_READER", NOTIF_COMMENT, Some("P_ONE"), None)
            .await
            .expect("notify failed");

        assert_eq!(count(&pool, "U_AUTHOR").await, 1);
        assert_eq!(count(&pool, "U_READER").await, 0);
    }

    #[tokio::test]
    async fn test_notify_skips_self() {
        let pool = test_pool().await;
        seed_user(&pool, "U_AUTHOR", "author").await;
        seed_post(&pool, "P_ONE", "U_AUTHOR", "hello").await;

        notify(&pool, "U_AUTHOR", "U_AUTHOR", NOTIF_REACTION, Some("P_ONE"), None)
            .await
            .expect("notify failed");

        assert_eq!(count(&pool, "U_AUTHOR").await, 0);
    }

    #[tokio::test]
    async fn test_list_notifications_unread_filter() {
        let pool = test_pool().await;
        seed_user(&pool, "U_AUTHOR", "author").await;
        seed_user(&pool, "U_READER", "reader").await;
        seed_post(&pool, "P_ONE", "U_AUTHOR", "hello").await;

        notify(&pool, "U_AUTHOR", "U_READER", NOTIF_COMMENT, Some("P_ONE"), None)
            .await
            .expect("notify failed");
        notify(&pool, "U_AUTHOR", "U_READER", NOTIF_REPLY, Some("P_ONE"), None)
            .await
            .expect("notify failed");

        // Mark the older notification read and only the unread one should
        // survive the ?unread=true filter.
        sqlx::query(
            "UPDATE notifications SET is_read = 1 WHERE id = \
             (SELECT id FROM notifications WHERE recipient_id = ? AND notif_type = ?)",
        )
        .bind("U_AUTHOR")
        .bind(NOTIF_COMMENT)
        .execute(&pool)
        .await
        .expect("update failed");

        let state = state_for(pool);

        let all = handlers::list_notifications(
            state.clone(),
            authed("U_AUTHOR", "author"),
            Query(NotificationQueryParams { unread: None }),
        )
        .await
        .expect("list failed");
        assert_eq!(all.0.count, 2);
        assert_eq!(all.0.unread_count, 1);

        let unread = handlers::list_notifications(
            state,
            authed("U_AUTHOR", "author"),
            Query(NotificationQueryParams { unread: Some(true) }),
        )
        .await
        .expect("filtered list failed");
        assert_eq!(unread.0.count, 1);
        assert_eq!(unread.0.unread_count, 1);
        assert_eq!(unread.0.results[0].notif_type, NOTIF_REPLY);
        assert!(!unread.0.results[0].is_read);
    }

    #[tokio::test]
    async fn test_read_state_scoped_to_recipient() {
        let pool = test_pool().await;
        seed_user(&pool, "U_AUTHOR", "author").await;
        seed_user(&pool, "U_READER", "reader").await;
        seed_post(&pool, "P_ONE", "U_AUTHOR", "hello").await;

        notify(&pool, "U_AUTHOR", "U_READER", NOTIF_COMMENT, Some("P_ONE"), None)
            .await
            .expect("notify failed");

        // A different user marking the row read must not touch it.
        let result =
            sqlx::query("UPDATE notifications SET is_read = 1 WHERE recipient_id = ?")
                .bind("U_READER")
                .execute(&pool)
                .await
                .expect("update failed");
        assert_eq!(result.rows_affected(), 0);

        let unread: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = ? AND is_read = 0",
        )
        .bind("U_AUTHOR")
        .fetch_one(&pool)
        .await
        .expect("count failed");
        assert_eq!(unread, 1);
    }
}
