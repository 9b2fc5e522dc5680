//! Credential store: persisted user records and OAuth account links
//!
//! All writes that could race (registration, concurrent OAuth callbacks for
//! the same provider identity) lean on storage-level uniqueness constraints
//! plus insert-then-reselect, so at most one identity row ever wins.

use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use super::models::User;
use super::password::{hash_password, verify_password};
use crate::common::{generate_raw_id, generate_user_id, safe_email_log, slugify, ApiError};

/// Minutes an issued OAuth state value stays valid
const OAUTH_STATE_TTL_MINUTES: i64 = 10;

/// Profile attributes carried over from an OAuth provider when a local
/// account has to be created for a first-time login
#[derive(Debug, Clone)]
pub struct OAuthProfileHints {
    pub email: String,
    pub username: Option<String>,
    pub avatar: Option<String>,
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, ApiError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await
        .map_err(ApiError::DatabaseError)
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<User>, ApiError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(ApiError::DatabaseError)
}

pub async fn find_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<User>, ApiError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await
        .map_err(ApiError::DatabaseError)
}

/// Create a user record; `password_hash` is None for OAuth-only accounts
///
/// A UNIQUE violation on the email column is translated to
/// `DuplicateIdentity` rather than leaking the raw constraint error.
pub async fn create_user(
    pool: &SqlitePool,
    email: &str,
    username: &str,
    password_hash: Option<&str>,
) -> Result<User, ApiError> {
    let id = generate_user_id();

    let insert = sqlx::query(
        "INSERT INTO users (id, email, username, password_hash) VALUES (?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(email)
    .bind(username)
    .bind(password_hash)
    .execute(pool)
    .await;

    if let Err(e) = insert {
        if is_unique_violation(&e, "users.email") {
            warn!(email = %safe_email_log(email), "Registration rejected: email already exists");
            return Err(ApiError::DuplicateIdentity);
        }
        if is_unique_violation(&e, "users.username") {
            return Err(ApiError::ValidationError(
                "username: already taken".to_string(),
            ));
        }
        return Err(ApiError::DatabaseError(e));
    }

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(&id)
        .fetch_one(pool)
        .await
        .map_err(ApiError::DatabaseError)?;

    info!(user_id = %user.id, email = %safe_email_log(email), "User account created");
    Ok(user)
}

/// Resolve the identity for a (provider, provider-user-id) pair, creating a
/// local account if this is the first login with that provider identity.
///
/// Safe under concurrent callbacks: the link insert uses ON CONFLICT DO
/// NOTHING against the composite primary key and the canonical user is
/// re-selected through the link afterwards, so both racing callers settle
/// on the same identity and any locally-created loser row is removed.
pub async fn find_or_create_by_oauth(
    pool: &SqlitePool,
    provider: &str,
    provider_user_id: &str,
    hints: &OAuthProfileHints,
) -> Result<User, ApiError> {
    if let Some(user) = find_by_oauth_link(pool, provider, provider_user_id).await? {
        debug!(user_id = %user.id, provider = provider, "Found existing OAuth-linked user");
        return Ok(user);
    }

    // Attach to an existing account with the same email, otherwise create a
    // fresh OAuth-only account.
    let (user, created_here) = match find_by_email(pool, &hints.email).await? {
        Some(existing) => (existing, false),
        None => (create_oauth_user(pool, hints).await?, true),
    };

    sqlx::query(
        r#"
        INSERT INTO oauth_accounts (provider, provider_user_id, user_id)
        VALUES (?, ?, ?)
        ON CONFLICT (provider, provider_user_id) DO NOTHING
        "#,
    )
    .bind(provider)
    .bind(provider_user_id)
    .bind(&user.id)
    .execute(pool)
    .await
    .map_err(ApiError::DatabaseError)?;

    let canonical = find_by_oauth_link(pool, provider, provider_user_id)
        .await?
        .ok_or_else(|| ApiError::InternalServer("oauth link vanished".to_string()))?;

    // We lost a concurrent race to link this provider identity; remove the
    // account row we just created so no orphan identity remains.
    if created_here && canonical.id != user.id {
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(&user.id)
            .execute(pool)
            .await
            .map_err(ApiError::DatabaseError)?;
        debug!(loser_id = %user.id, winner_id = %canonical.id, "Discarded losing row in OAuth link race");
    }

    if canonical.id == user.id && created_here {
        info!(
            user_id = %canonical.id,
            email = %safe_email_log(&hints.email),
            provider = provider,
            "New user account created via OAuth"
        );
    }

    Ok(canonical)
}

async fn find_by_oauth_link(
    pool: &SqlitePool,
    provider: &str,
    provider_user_id: &str,
) -> Result<Option<User>, ApiError> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT u.* FROM users u
        JOIN oauth_accounts oa ON oa.user_id = u.id
        WHERE oa.provider = ? AND oa.provider_user_id = ?
        "#,
    )
    .bind(provider)
    .bind(provider_user_id)
    .fetch_optional(pool)
    .await
    .map_err(ApiError::DatabaseError)
}

async fn create_oauth_user(pool: &SqlitePool, hints: &OAuthProfileHints) -> Result<User, ApiError> {
    let base = hints
        .username
        .as_deref()
        .map(slugify)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| {
            let local = hints.email.split('@').next().unwrap_or("user");
            let slug = slugify(local);
            if slug.is_empty() {
                "user".to_string()
            } else {
                slug
            }
        });

    let mut username = base.clone();
    for attempt in 0..3 {
        let id = generate_user_id();
        let insert = sqlx::query(
            "INSERT INTO users (id, email, username, avatar) VALUES (?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&hints.email)
        .bind(&username)
        .bind(hints.avatar.as_deref())
        .execute(pool)
        .await;

        match insert {
            Ok(_) => {
                return sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
                    .bind(&id)
                    .fetch_one(pool)
                    .await
                    .map_err(ApiError::DatabaseError);
            }
            Err(e) if is_unique_violation(&e, "users.email") => {
                // A concurrent callback created this account first.
                return find_by_email(pool, &hints.email)
                    .await?
                    .ok_or_else(|| ApiError::InternalServer("user row vanished".to_string()));
            }
            Err(e) if is_unique_violation(&e, "users.username") && attempt < 2 => {
                username = format!("{}_{}", base, generate_raw_id(4).to_lowercase());
            }
            Err(e) => return Err(ApiError::DatabaseError(e)),
        }
    }

    Err(ApiError::InternalServer(
        "could not allocate a unique username".to_string(),
    ))
}

/// Verify email/password credentials against the store
///
/// Unknown email, wrong password and disabled account all fail with the same
/// `InvalidCredentials`; a dummy hash is computed on the miss paths so the
/// cases are also timing-uniform.
pub async fn authenticate(
    pool: &SqlitePool,
    email: &str,
    password: &str,
) -> Result<User, ApiError> {
    let user = find_by_email(pool, email).await?;

    match user {
        Some(u) if !u.is_disabled() => {
            let ok = u
                .password_hash
                .as_deref()
                .map(|h| verify_password(h, password))
                .unwrap_or_else(|| {
                    let _ = hash_password(password);
                    false
                });
            if ok {
                Ok(u)
            } else {
                warn!(email = %safe_email_log(email), "Login failed: password mismatch");
                Err(ApiError::InvalidCredentials)
            }
        }
        _ => {
            let _ = hash_password(password);
            warn!(email = %safe_email_log(email), "Login failed: no usable account");
            Err(ApiError::InvalidCredentials)
        }
    }
}

// ---- Refresh token revocation ----

pub async fn revoke_token(pool: &SqlitePool, jti: &str, user_id: &str) -> Result<(), ApiError> {
    sqlx::query("INSERT OR IGNORE INTO revoked_tokens (jti, user_id) VALUES (?, ?)")
        .bind(jti)
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(ApiError::DatabaseError)?;
    Ok(())
}

pub async fn is_token_revoked(pool: &SqlitePool, jti: &str) -> Result<bool, ApiError> {
    let row: Option<(String,)> = sqlx::query_as("SELECT jti FROM revoked_tokens WHERE jti = ?")
        .bind(jti)
        .fetch_optional(pool)
        .await
        .map_err(ApiError::DatabaseError)?;
    Ok(row.is_some())
}

// ---- OAuth anti-forgery state ----

/// Generate and persist a state value for the redirect step
pub async fn issue_oauth_state(pool: &SqlitePool, provider: &str) -> Result<String, ApiError> {
    let state = generate_raw_id(32);

    sqlx::query(
        r#"
        INSERT INTO oauth_states (state, provider, expires_at)
        VALUES (?, ?, datetime('now', ? || ' minutes'))
        "#,
    )
    .bind(&state)
    .bind(provider)
    .bind(OAUTH_STATE_TTL_MINUTES)
    .execute(pool)
    .await
    .map_err(ApiError::DatabaseError)?;

    Ok(state)
}

/// Consume a state value exactly once
///
/// The delete-returning form is atomic, so a replayed callback with the same
/// state fails even if it arrives concurrently. Unknown, expired and
/// already-used states are indistinguishable to the caller.
pub async fn consume_oauth_state(
    pool: &SqlitePool,
    provider: &str,
    state: &str,
) -> Result<(), ApiError> {
    let consumed: Option<(String,)> = sqlx::query_as(
        r#"
        DELETE FROM oauth_states
        WHERE state = ? AND provider = ? AND expires_at > datetime('now')
        RETURNING state
        "#,
    )
    .bind(state)
    .bind(provider)
    .fetch_optional(pool)
    .await
    .map_err(ApiError::DatabaseError)?;

    if consumed.is_none() {
        warn!(provider = provider, "OAuth callback with unknown or expired state");
        return Err(ApiError::StateMismatch);
    }

    Ok(())
}

fn is_unique_violation(e: &sqlx::Error, constraint: &str) -> bool {
    match e {
        sqlx::Error::Database(db) => {
            let msg = db.message();
            msg.contains("UNIQUE constraint failed") && msg.contains(constraint)
        }
        _ => false,
    }
}
