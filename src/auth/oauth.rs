// src/auth/oauth.rs
//! OAuth provider integration (Google, GitHub)
//!
//! Covers the provider-facing half of the linking flow: building the
//! authorization URL, exchanging the callback code for an access credential,
//! and fetching the provider profile. State handling and identity resolution
//! live in `store`.

use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::common::ApiError;

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("provider not configured")]
    NotConfigured,

    #[error("token exchange failed: {0}")]
    ExchangeFailed(String),

    #[error("profile fetch failed: {0}")]
    ProfileFetchFailed(String),

    #[error("provider profile did not include a usable email")]
    MissingEmail,
}

impl From<OAuthError> for ApiError {
    fn from(e: OAuthError) -> Self {
        match e {
            OAuthError::NotConfigured => {
                ApiError::NotFound("unknown oauth provider".to_string())
            }
            other => ApiError::ProviderExchangeFailed(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Google,
    Github,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::Github => "github",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(Provider::Google),
            "github" => Ok(Provider::Github),
            _ => Err(ApiError::NotFound("unknown oauth provider".to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProviderCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Per-provider OAuth configuration, read from the environment at startup
#[derive(Clone)]
pub struct OAuthConfig {
    pub google: Option<ProviderCredentials>,
    pub github: Option<ProviderCredentials>,
    pub redirect_base: String,
}

impl OAuthConfig {
    pub fn from_env() -> Self {
        let read = |id_key: &str, secret_key: &str| -> Option<ProviderCredentials> {
            let client_id = std::env::var(id_key).ok().filter(|v| !v.is_empty())?;
            let client_secret = std::env::var(secret_key).ok().filter(|v| !v.is_empty())?;
            Some(ProviderCredentials {
                client_id,
                client_secret,
            })
        };

        Self {
            google: read("GOOGLE_CLIENT_ID", "GOOGLE_CLIENT_SECRET"),
            github: read("GITHUB_CLIENT_ID", "GITHUB_CLIENT_SECRET"),
            redirect_base: std::env::var("OAUTH_REDIRECT_BASE")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
        }
    }

    pub fn credentials(&self, provider: Provider) -> Result<&ProviderCredentials, OAuthError> {
        let creds = match provider {
            Provider::Google => self.google.as_ref(),
            Provider::Github => self.github.as_ref(),
        };
        creds.ok_or(OAuthError::NotConfigured)
    }

    /// Callback URI registered with the provider for this deployment
    pub fn redirect_uri(&self, provider: Provider) -> String {
        format!(
            "{}/auth/oauth/{}/callback",
            self.redirect_base.trim_end_matches('/'),
            provider
        )
    }
}

/// Normalized profile returned by every provider
#[derive(Debug, Clone)]
pub struct ProviderProfile {
    pub provider_user_id: String,
    pub email: String,
    pub username: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenExchangeResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    sub: String,
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GithubUserInfo {
    id: i64,
    login: String,
    email: Option<String>,
    avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GithubEmail {
    email: String,
    primary: bool,
    verified: bool,
}

/// Build the provider authorization URL the client is redirected to
pub fn authorization_url(
    provider: Provider,
    creds: &ProviderCredentials,
    redirect_uri: &str,
    state: &str,
) -> String {
    match provider {
        Provider::Google => format!(
            "https://accounts.google.com/o/oauth2/v2/auth?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            urlencoding::encode(&creds.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode("openid email profile"),
            urlencoding::encode(state),
        ),
        Provider::Github => format!(
            "https://github.com/login/oauth/authorize?client_id={}&redirect_uri={}&scope={}&state={}",
            urlencoding::encode(&creds.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode("read:user user:email"),
            urlencoding::encode(state),
        ),
    }
}

/// Exchange an authorization code for a provider access token
pub async fn exchange_code(
    http: &Client,
    provider: Provider,
    creds: &ProviderCredentials,
    code: &str,
    redirect_uri: &str,
) -> Result<String, OAuthError> {
    let token_url = match provider {
        Provider::Google => "https://oauth2.googleapis.com/token",
        Provider::Github => "https://github.com/login/oauth/access_token",
    };

    let params = [
        ("code", code),
        ("client_id", creds.client_id.as_str()),
        ("client_secret", creds.client_secret.as_str()),
        ("redirect_uri", redirect_uri),
        ("grant_type", "authorization_code"),
    ];

    let response = http
        .post(token_url)
        .header("Accept", "application/json")
        .form(&params)
        .send()
        .await
        .map_err(|e| OAuthError::ExchangeFailed(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unreadable body".to_string());
        return Err(OAuthError::ExchangeFailed(format!("HTTP {}: {}", status, body)));
    }

    let token = response
        .json::<TokenExchangeResponse>()
        .await
        .map_err(|e| OAuthError::ExchangeFailed(e.to_string()))?;

    Ok(token.access_token)
}

/// Fetch the provider profile for an exchanged access token
pub async fn fetch_profile(
    http: &Client,
    provider: Provider,
    access_token: &str,
) -> Result<ProviderProfile, OAuthError> {
    match provider {
        Provider::Google => fetch_google_profile(http, access_token).await,
        Provider::Github => fetch_github_profile(http, access_token).await,
    }
}

async fn fetch_google_profile(
    http: &Client,
    access_token: &str,
) -> Result<ProviderProfile, OAuthError> {
    let info = http
        .get("https://openidconnect.googleapis.com/v1/userinfo")
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| OAuthError::ProfileFetchFailed(e.to_string()))?
        .error_for_status()
        .map_err(|e| OAuthError::ProfileFetchFailed(e.to_string()))?
        .json::<GoogleUserInfo>()
        .await
        .map_err(|e| OAuthError::ProfileFetchFailed(e.to_string()))?;

    let email = info.email.ok_or(OAuthError::MissingEmail)?;

    Ok(ProviderProfile {
        provider_user_id: info.sub,
        email,
        username: info.name,
        avatar: info.picture,
    })
}

async fn fetch_github_profile(
    http: &Client,
    access_token: &str,
) -> Result<ProviderProfile, OAuthError> {
    let info = http
        .get("https://api.github.com/user")
        .bearer_auth(access_token)
        .header("User-Agent", "blog-api")
        .header("Accept", "application/vnd.github+json")
        .send()
        .await
        .map_err(|e| OAuthError::ProfileFetchFailed(e.to_string()))?
        .error_for_status()
        .map_err(|e| OAuthError::ProfileFetchFailed(e.to_string()))?
        .json::<GithubUserInfo>()
        .await
        .map_err(|e| OAuthError::ProfileFetchFailed(e.to_string()))?;

    // The public profile email is often unset; fall back to the primary
    // verified address from the emails endpoint.
    let email = match info.email {
        Some(e) => e,
        None => fetch_github_primary_email(http, access_token)
            .await?
            .ok_or(OAuthError::MissingEmail)?,
    };

    Ok(ProviderProfile {
        provider_user_id: info.id.to_string(),
        email,
        username: Some(info.login),
        avatar: info.avatar_url,
    })
}

async fn fetch_github_primary_email(
    http: &Client,
    access_token: &str,
) -> Result<Option<String>, OAuthError> {
    let response = http
        .get("https://api.github.com/user/emails")
        .bearer_auth(access_token)
        .header("User-Agent", "blog-api")
        .header("Accept", "application/vnd.github+json")
        .send()
        .await
        .map_err(|e| OAuthError::ProfileFetchFailed(e.to_string()))?;

    if !response.status().is_success() {
        return Ok(None);
    }

    let emails = response
        .json::<Vec<GithubEmail>>()
        .await
        .map_err(|e| OAuthError::ProfileFetchFailed(e.to_string()))?;

    Ok(emails
        .into_iter()
        .find(|e| e.primary && e.verified)
        .map(|e| e.email))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> ProviderCredentials {
        ProviderCredentials {
            client_id: "client-123".to_string(),
            client_secret: "secret".to_string(),
        }
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("google".parse::<Provider>().unwrap(), Provider::Google);
        assert_eq!("github".parse::<Provider>().unwrap(), Provider::Github);
        assert!("facebook".parse::<Provider>().is_err());
    }

    #[test]
    fn test_authorization_url_carries_state_and_redirect() {
        let url = authorization_url(
            Provider::Google,
            &creds(),
            "http://localhost:8080/auth/oauth/google/callback",
            "STATE123",
        );
        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=client-123"));
        assert!(url.contains("state=STATE123"));
        assert!(url.contains(
            "redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fauth%2Foauth%2Fgoogle%2Fcallback"
        ));
        // the secret never appears in the browser-facing URL
        assert!(!url.contains("secret"));
    }

    #[test]
    fn test_redirect_uri_per_provider() {
        let config = OAuthConfig {
            google: Some(creds()),
            github: None,
            redirect_base: "https://blog.example.com/".to_string(),
        };
        assert_eq!(
            config.redirect_uri(Provider::Github),
            "https://blog.example.com/auth/oauth/github/callback"
        );
        assert!(config.credentials(Provider::Google).is_ok());
        assert!(matches!(
            config.credentials(Provider::Github),
            Err(OAuthError::NotConfigured)
        ));
    }
}
