//! Tests for reaction toggling and share bookkeeping

#[cfg(test)]
mod tests {
    use axum::extract::{Extension, Path, Query};
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use crate::auth::oauth::OAuthConfig;
    use crate::auth::token::TokenIssuer;
    use crate::auth::AuthedUser;
    use crate::common::{migrations, ApiError, AppState};
    use crate::reactions::handlers::{self, reaction_counts, toggle, Target};
    use crate::reactions::models::{is_valid_platform, is_valid_reaction, ReactionQueryParams};

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

    async fn seed(pool: &SqlitePool) {
        for (id, name) in [("U_ONE", "alice"), ("U_TWO", "bob")] {
            sqlx::query("INSERT INTO users (id, email, username) VALUES (?, ?, ?)")
                .bind(id)
                .bind(format!("{}@example.com", name))
                .bind(name)
                .execute(pool)
                .await
                .expect("failed to seed user");
        }
        sqlx::query(
            "INSERT INTO posts (id, author_id, title, slug, content, status) \
             VALUES ('P_ONE', 'U_ONE', 'Hello', 'hello', 'body', 'published')",
        )
        .execute(pool)
        .await
        .expect("failed to seed post");
        sqlx::query(
            "INSERT INTO comments (id, post_id, author_id, body) \
             VALUES ('M_ONE', 'P_ONE', 'U_ONE', 'first')",
        )
        .execute(pool)
        .await
        .expect("failed to seed comment");
    }

    #[tokio::test]
    async fn test_toggle_sets_then_removes() {
        let pool = test_pool().await;
        seed(&pool).await;
        let target = Target::Post("P_ONE".to_string());

        let current = toggle(&pool, "U_TWO", &target, "like").await.expect("toggle failed");
        assert_eq!(current.as_deref(), Some("like"));
        assert_eq!(reaction_counts(&pool, &target).await.expect("counts"), (1, 0));

        // Same reaction again toggles it off.
        let current = toggle(&pool, "U_TWO", &target, "like").await.expect("toggle failed");
        assert_eq!(current, None);
        assert_eq!(reaction_counts(&pool, &target).await.expect("counts"), (0, 0));
    }

    #[tokio::test]
    async fn test_toggle_switches_reaction() {
        let pool = test_pool().await;
        seed(&pool).await;
        let target = Target::Post("P_ONE".to_string());

        toggle(&pool, "U_TWO", &target, "like").await.expect("toggle failed");
        let current = toggle(&pool, "U_TWO", &target, "dislike").await.expect("toggle failed");
        assert_eq!(current.as_deref(), Some("dislike"));

        // Still one row for this user, not two.
        let rows: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM reactions WHERE user_id = 'U_TWO' AND post_id = 'P_ONE'",
        )
        .fetch_one(&pool)
        .await
        .expect("count failed");
        assert_eq!(rows, 1);
        assert_eq!(reaction_counts(&pool, &target).await.expect("counts"), (0, 1));
    }

    #[tokio::test]
    async fn test_post_and_comment_reactions_are_independent() {
        let pool = test_pool().await;
        seed(&pool).await;

        let post = Target::Post("P_ONE".to_string());
        let comment = Target::Comment("M_ONE".to_string());

        toggle(&pool, "U_TWO", &post, "like").await.expect("toggle failed");
        toggle(&pool, "U_TWO", &comment, "like").await.expect("toggle failed");

        assert_eq!(reaction_counts(&pool, &post).await.expect("counts"), (1, 0));
        assert_eq!(reaction_counts(&pool, &comment).await.expect("counts"), (1, 0));
    }

    #[tokio::test]
    async fn test_share_breakdown_groups_by_platform() {
        let pool = test_pool().await;
        seed(&pool).await;

        for (id, platform) in [("S_1", "twitter"), ("S_2", "twitter"), ("S_3", "email")] {
            sqlx::query("INSERT INTO shares (id, user_id, post_id, platform) VALUES (?, 'U_TWO', 'P_ONE', ?)")
                .bind(id)
                .bind(platform)
                .execute(&pool)
                .await
                .expect("failed to seed share");
        }

        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT platform, COUNT(*) FROM shares WHERE post_id = 'P_ONE' \
             GROUP BY platform ORDER BY COUNT(*) DESC, platform",
        )
        .fetch_all(&pool)
        .await
        .expect("breakdown query failed");

        assert_eq!(rows, vec![("twitter".to_string(), 2), ("email".to_string(), 1)]);
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

    fn authed(id: &str, role: &str) -> AuthedUser {
        AuthedUser {
            id: id.to_string(),
            email: format!("{}@example.com", id),
            username: id.to_lowercase(),
            role: role.to_string(),
        }
    }

    fn filters(post: Option<&str>, reaction_type: Option<&str>) -> Query<ReactionQueryParams> {
        Query(ReactionQueryParams {
            post: post.map(str::to_string),
            comment: None,
            reaction_type: reaction_type.map(str::to_string),
        })
    }

    #[tokio::test]
    async fn test_list_reactions_filters_by_post_and_type() {
        let pool = test_pool().await;
        seed(&pool).await;
        toggle(&pool, "U_ONE", &Target::Post("P_ONE".to_string()), "like")
            .await
            .expect("toggle failed");
        toggle(&pool, "U_TWO", &Target::Post("P_ONE".to_string()), "dislike")
            .await
            .expect("toggle failed");
        toggle(&pool, "U_TWO", &Target::Comment("M_ONE".to_string()), "like")
            .await
            .expect("toggle failed");
        let state = state_for(pool);

        let all = handlers::list_reactions(state.clone(), filters(Some("P_ONE"), None))
            .await
            .expect("list failed");
        assert_eq!(all.0.len(), 2);

        let likes = handlers::list_reactions(state.clone(), filters(Some("P_ONE"), Some("like")))
            .await
            .expect("list failed");
        assert_eq!(likes.0.len(), 1);
        assert_eq!(likes.0[0].user_id, "U_ONE");

        let elsewhere = handlers::list_reactions(state, filters(Some("P_MISSING"), None))
            .await
            .expect("list failed");
        assert!(elsewhere.0.is_empty());
    }

    #[tokio::test]
    async fn test_delete_reaction_owner_and_admin_only() {
        let pool = test_pool().await;
        seed(&pool).await;
        toggle(&pool, "U_TWO", &Target::Post("P_ONE".to_string()), "like")
            .await
            .expect("toggle failed");
        let id: String = sqlx::query_scalar("SELECT id FROM reactions WHERE user_id = 'U_TWO'")
            .fetch_one(&pool)
            .await
            .expect("seed lookup failed");
        let state = state_for(pool);

        // Someone else's reaction is off limits.
        let err = handlers::delete_reaction(state.clone(), authed("U_ONE", "viewer"), Path(id.clone()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));

        // The owner may remove it.
        handlers::delete_reaction(state.clone(), authed("U_TWO", "viewer"), Path(id.clone()))
            .await
            .expect("owner delete failed");

        let err = handlers::delete_reaction(state, authed("U_TWO", "viewer"), Path(id))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_reaction_admin_bypasses_ownership() {
        let pool = test_pool().await;
        seed(&pool).await;
        toggle(&pool, "U_TWO", &Target::Post("P_ONE".to_string()), "like")
            .await
            .expect("toggle failed");
        let id: String = sqlx::query_scalar("SELECT id FROM reactions WHERE user_id = 'U_TWO'")
            .fetch_one(&pool)
            .await
            .expect("seed lookup failed");
        let state = state_for(pool);

        handlers::delete_reaction(state, authed("U_ONE", "admin"), Path(id))
            .await
            .expect("admin delete failed");
    }

    #[test]
    fn test_reaction_and_platform_validation() {
        assert!(is_valid_reaction("like"));
        assert!(is_valid_reaction("dislike"));
        assert!(!is_valid_reaction("love"));

        assert!(is_valid_platform("twitter"));
        assert!(is_valid_platform("other"));
        assert!(!is_valid_platform("myspace"));
    }
}
