//! Auth types
//!
//! Token cache entry shared between the authenticator and its tests.

use chrono::{DateTime, Utc};

/// Cached access token with expiration
#[derive(Debug, Clone)]
pub struct CachedToken {
    /// The access token
    pub token: String,
    /// When the token expires
    pub expires_at: Option<DateTime<Utc>>,
}

impl CachedToken {
    /// Create a new cached token
    pub fn new(token: String, expires_at: Option<DateTime<Utc>>) -> Self {
        Self { token, expires_at }
    }

    /// Create a token that expires in N seconds from now
    pub fn expires_in(token: String, seconds: i64) -> Self {
        let expires_at = Utc::now() + chrono::Duration::seconds(seconds);
        Self {
            token,
            expires_at: Some(expires_at),
        }
    }

    /// Check if the token is due for refresh (60 second pad before the
    /// reported expiry)
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                let pad = chrono::Duration::seconds(60);
                Utc::now() + pad >= expires_at
            }
            None => false, // No expiration = never expires
        }
    }
}
