//! Authenticator implementation
//!
//! Fetches access tokens over the OAuth2 refresh-token grant and persists
//! the rotated refresh token back to the config file.

use super::types::CachedToken;
use crate::config::{self, TapConfig};
use crate::error::{Error, Result};
use reqwest::Client;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// HelpScout token endpoint
pub const DEFAULT_TOKEN_URL: &str = "https://api.helpscout.net/v2/oauth2/token";

/// Fetches and caches OAuth2 access tokens.
///
/// HelpScout rotates the refresh token on every grant, so each successful
/// refresh also rewrites `refresh_token` in the config file at its
/// original path. Later grants in the same process use the rotated token
/// held in memory.
pub struct Authenticator {
    /// OAuth2 application client id
    client_id: String,
    /// OAuth2 application client secret
    client_secret: String,
    /// User-Agent header sent on token requests
    user_agent: String,
    /// Token endpoint, overridable for tests
    token_url: String,
    /// Config file receiving rotated refresh tokens
    config_path: PathBuf,
    /// Rotating refresh token plus the cached access token
    credentials: Arc<RwLock<Credentials>>,
    /// HTTP client for token requests
    http_client: Client,
}

#[derive(Debug)]
struct Credentials {
    refresh_token: String,
    cached: Option<CachedToken>,
}

impl Authenticator {
    /// Create a new authenticator for the given config
    pub fn new(config: &TapConfig, config_path: impl AsRef<Path>) -> Self {
        Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            user_agent: config.user_agent.clone(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            config_path: config_path.as_ref().to_path_buf(),
            credentials: Arc::new(RwLock::new(Credentials {
                refresh_token: config.refresh_token.clone(),
                cached: None,
            })),
            http_client: Client::new(),
        }
    }

    /// Override the token endpoint (mock servers in tests)
    #[must_use]
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// Get a valid access token, refreshing if necessary
    pub async fn access_token(&self) -> Result<String> {
        // Check if we have a valid cached token
        {
            let credentials = self.credentials.read().await;
            if let Some(token) = credentials.cached.as_ref() {
                if !token.is_expired() {
                    return Ok(token.token.clone());
                }
            }
        }

        // Need to refresh - acquire write lock
        let mut credentials = self.credentials.write().await;

        // Double-check after acquiring write lock (another task might have refreshed)
        if let Some(token) = credentials.cached.as_ref() {
            if !token.is_expired() {
                return Ok(token.token.clone());
            }
        }

        let token_response = self.request_token(&credentials.refresh_token).await?;

        // The grant invalidated the old refresh token. Later refreshes
        // need the new one, and the config file must carry it so the next
        // process run can authenticate at all.
        credentials.refresh_token = token_response.refresh_token.clone();
        config::rewrite_credentials(&self.config_path, &token_response.refresh_token, None).await?;
        debug!("refreshed access token and rotated refresh token");

        let cached = token_response.into_cached_token();
        let token = cached.token.clone();
        credentials.cached = Some(cached);

        Ok(token)
    }

    /// Fetch a token pair with the refresh-token grant
    async fn request_token(&self, refresh_token: &str) -> Result<TokenResponse> {
        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", refresh_token),
        ];

        let response = self
            .http_client
            .post(&self.token_url)
            .header("User-Agent", &self.user_agent)
            .form(&form)
            .send()
            .await
            .map_err(Error::Http)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::TokenRefresh {
                message: format!("Token request failed with status {status}: {body}"),
            });
        }

        response.json().await.map_err(Error::Http)
    }

    /// Clear the cached token (forces a refresh on next use)
    pub async fn clear_cache(&self) {
        let mut credentials = self.credentials.write().await;
        credentials.cached = None;
    }

    /// The refresh token the next grant will present
    pub async fn current_refresh_token(&self) -> String {
        self.credentials.read().await.refresh_token.clone()
    }
}

/// OAuth2 token response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    #[allow(dead_code)]
    token_type: Option<String>,
}

impl TokenResponse {
    fn into_cached_token(self) -> CachedToken {
        match self.expires_in {
            Some(secs) => CachedToken::expires_in(self.access_token, secs),
            None => CachedToken::new(self.access_token, None),
        }
    }
}
