//! Tests for auth module
//!
//! Covers token issuance/verification, the credential store (including the
//! concurrent OAuth find-or-create guarantee), revocation, and the OAuth
//! state lifecycle.

#[cfg(test)]
mod tests {
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    use crate::auth::password::hash_password;
    use crate::auth::store::{self, OAuthProfileHints};
    use crate::auth::token::TokenIssuer;
    use crate::common::{migrations, ApiError};

    fn issuer() -> TokenIssuer {
        TokenIssuer::new("test_secret_key", 60, 7)
    }

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

    fn hints(email: &str) -> OAuthProfileHints {
        OAuthProfileHints {
            email: email.to_string(),
            username: Some("OAuth User".to_string()),
            avatar: None,
        }
    }

    // ---- Token Issuer ----

    #[test]
    fn test_issue_then_verify_resolves_same_identity() {
        let tokens = issuer();
        let pair = tokens.issue("U_TEST01").expect("issue failed");

        let access = tokens.verify_access(&pair.access_token).expect("verify failed");
        assert_eq!(access.sub, "U_TEST01");
        assert_eq!(access.token_type, "access");

        let refresh = tokens.verify_refresh(&pair.refresh_token).expect("verify failed");
        assert_eq!(refresh.sub, "U_TEST01");
        assert_eq!(refresh.token_type, "refresh");
    }

    #[test]
    fn test_expired_token_fails_with_token_expired() {
        // Negative lifetimes put exp in the past at issue time.
        let tokens = TokenIssuer::new("test_secret_key", -5, 7);
        let pair = tokens.issue("U_TEST01").expect("issue failed");

        let err = tokens.verify_access(&pair.access_token).unwrap_err();
        assert!(matches!(err, ApiError::TokenExpired));
    }

    #[test]
    fn test_wrong_secret_fails_with_token_invalid() {
        let pair = issuer().issue("U_TEST01").expect("issue failed");

        let other = TokenIssuer::new("a_different_secret", 60, 7);
        let err = other.verify_access(&pair.access_token).unwrap_err();
        assert!(matches!(err, ApiError::TokenInvalid));
    }

    #[test]
    fn test_token_type_is_enforced() {
        let tokens = issuer();
        let pair = tokens.issue("U_TEST01").expect("issue failed");

        // A refresh token at the authorization gate is invalid...
        assert!(matches!(
            tokens.verify_access(&pair.refresh_token).unwrap_err(),
            ApiError::TokenInvalid
        ));
        // ...and an access token at the refresh endpoint is too.
        assert!(matches!(
            tokens.verify_refresh(&pair.access_token).unwrap_err(),
            ApiError::TokenInvalid
        ));
    }

    #[test]
    fn test_garbage_token_fails_with_token_invalid() {
        let err = issuer().verify_access("not.a.jwt").unwrap_err();
        assert!(matches!(err, ApiError::TokenInvalid));
    }

    #[test]
    fn test_refreshed_access_token_keeps_identity() {
        let tokens = issuer();
        let pair = tokens.issue("U_TEST01").expect("issue failed");

        let refresh_claims = tokens.verify_refresh(&pair.refresh_token).unwrap();
        let new_access = tokens.issue_access(&refresh_claims.sub).unwrap();
        let claims = tokens.verify_access(&new_access).unwrap();
        assert_eq!(claims.sub, "U_TEST01");
    }

    // ---- Credential store ----

    #[tokio::test]
    async fn test_create_user_and_find_by_email() {
        let pool = test_pool().await;
        let hash = hash_password("p1p1p1p1").unwrap();

        let user = store::create_user(&pool, "a@x.com", "alice", Some(&hash))
            .await
            .expect("create failed");
        assert!(user.id.starts_with("U_"));
        assert_eq!(user.role, "viewer");

        let found = store::find_by_email(&pool, "a@x.com").await.unwrap();
        assert_eq!(found.unwrap().id, user.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_duplicate_identity() {
        let pool = test_pool().await;
        store::create_user(&pool, "a@x.com", "alice", None)
            .await
            .unwrap();

        let err = store::create_user(&pool, "a@x.com", "alice2", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::DuplicateIdentity));
    }

    #[tokio::test]
    async fn test_login_is_uniform_for_unknown_email_and_wrong_password() {
        let pool = test_pool().await;
        let hash = hash_password("p1p1p1p1").unwrap();
        store::create_user(&pool, "a@x.com", "alice", Some(&hash))
            .await
            .unwrap();

        let ok = store::authenticate(&pool, "a@x.com", "p1p1p1p1").await;
        assert_eq!(ok.unwrap().email, "a@x.com");

        let wrong_password = store::authenticate(&pool, "a@x.com", "wrong").await.unwrap_err();
        let unknown_email = store::authenticate(&pool, "b@x.com", "p1p1p1p1")
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, ApiError::InvalidCredentials));
        assert!(matches!(unknown_email, ApiError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_oauth_only_account_cannot_password_login() {
        let pool = test_pool().await;
        store::create_user(&pool, "oauth@x.com", "oauthuser", None)
            .await
            .unwrap();

        let err = store::authenticate(&pool, "oauth@x.com", "anything").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_then_verify_resolves_registered_identity() {
        let pool = test_pool().await;
        let tokens = issuer();
        let hash = hash_password("p1p1p1p1").unwrap();
        let user = store::create_user(&pool, "a@x.com", "alice", Some(&hash))
            .await
            .unwrap();

        let authed = store::authenticate(&pool, "a@x.com", "p1p1p1p1").await.unwrap();
        let pair = tokens.issue(&authed.id).unwrap();
        let claims = tokens.verify_access(&pair.access_token).unwrap();
        assert_eq!(claims.sub, user.id);
    }

    // ---- OAuth find-or-create ----

    #[tokio::test]
    async fn test_find_or_create_by_oauth_creates_once() {
        let pool = test_pool().await;

        let first = store::find_or_create_by_oauth(&pool, "google", "g-123", &hints("o@x.com"))
            .await
            .unwrap();
        let second = store::find_or_create_by_oauth(&pool, "google", "g-123", &hints("o@x.com"))
            .await
            .unwrap();
        assert_eq!(first.id, second.id);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_oauth_links_to_existing_email_account() {
        let pool = test_pool().await;
        let hash = hash_password("p1p1p1p1").unwrap();
        let existing = store::create_user(&pool, "a@x.com", "alice", Some(&hash))
            .await
            .unwrap();

        let resolved = store::find_or_create_by_oauth(&pool, "github", "gh-7", &hints("a@x.com"))
            .await
            .unwrap();
        assert_eq!(resolved.id, existing.id);
        // the password login still works after linking
        assert!(resolved.password_hash.is_some());
    }

    #[tokio::test]
    async fn test_concurrent_oauth_callbacks_create_one_identity() {
        let pool = test_pool().await;

        let profile = hints("race@x.com");
        let (a, b) = tokio::join!(
            store::find_or_create_by_oauth(&pool, "google", "g-race", &profile),
            store::find_or_create_by_oauth(&pool, "google", "g-race", &profile),
        );

        let a = a.unwrap();
        let b = b.unwrap();
        assert_eq!(a.id, b.id);

        let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(users, 1);

        let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM oauth_accounts")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(links, 1);
    }

    #[tokio::test]
    async fn test_one_identity_many_providers() {
        let pool = test_pool().await;

        let via_google = store::find_or_create_by_oauth(&pool, "google", "g-1", &hints("m@x.com"))
            .await
            .unwrap();
        let via_github = store::find_or_create_by_oauth(&pool, "github", "gh-1", &hints("m@x.com"))
            .await
            .unwrap();
        assert_eq!(via_google.id, via_github.id);

        let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM oauth_accounts")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(links, 2);
    }

    // ---- Revocation ----

    #[tokio::test]
    async fn test_revoked_refresh_token_is_detected() {
        let pool = test_pool().await;
        let tokens = issuer();
        let pair = tokens.issue("U_TEST01").unwrap();
        let claims = tokens.verify_refresh(&pair.refresh_token).unwrap();

        assert!(!store::is_token_revoked(&pool, &claims.jti).await.unwrap());
        store::revoke_token(&pool, &claims.jti, "U_TEST01").await.unwrap();
        assert!(store::is_token_revoked(&pool, &claims.jti).await.unwrap());
    }

    // ---- OAuth state ----

    #[tokio::test]
    async fn test_oauth_state_is_single_use() {
        let pool = test_pool().await;

        let state = store::issue_oauth_state(&pool, "google").await.unwrap();
        assert!(store::consume_oauth_state(&pool, "google", &state).await.is_ok());

        // replaying the same state fails
        let err = store::consume_oauth_state(&pool, "google", &state)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::StateMismatch));
    }

    #[tokio::test]
    async fn test_unknown_state_is_mismatch() {
        let pool = test_pool().await;
        let err = store::consume_oauth_state(&pool, "google", "never-issued")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::StateMismatch));
    }

    #[tokio::test]
    async fn test_state_is_bound_to_its_provider() {
        let pool = test_pool().await;
        let state = store::issue_oauth_state(&pool, "google").await.unwrap();

        let err = store::consume_oauth_state(&pool, "github", &state)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::StateMismatch));
    }
}
