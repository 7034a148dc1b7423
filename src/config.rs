//! Tap configuration
//!
//! Loads the Singer config file (JSON) holding HelpScout OAuth2 credentials
//! and the replication start date. HelpScout rotates the refresh token on
//! every grant, so the file is also a write target: `rewrite_credentials`
//! persists rotated tokens back to the same path.

use crate::error::{Error, Result};
use crate::types::JsonValue;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config keys that must be present and non-empty
pub const REQUIRED_CONFIG_KEYS: &[&str] = &[
    "client_id",
    "client_secret",
    "refresh_token",
    "user_agent",
    "start_date",
];

/// Tap configuration loaded from the `--config` JSON file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TapConfig {
    /// OAuth2 application client id
    pub client_id: String,

    /// OAuth2 application client secret
    pub client_secret: String,

    /// Current refresh token (rotates on every grant)
    pub refresh_token: String,

    /// User-Agent header sent on every request
    pub user_agent: String,

    /// Default replication cursor for streams with no bookmark (UTC ISO-8601)
    pub start_date: String,

    /// Access token key some configs carry; its expiry is unknown, so the
    /// authenticator fetches a fresh token instead of trusting it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

impl TapConfig {
    /// Load and validate config from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
            message: format!(
                "Failed to read config file {}: {e}",
                path.as_ref().display()
            ),
        })?;
        Self::from_json(&contents)
    }

    /// Parse and validate config from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let value: JsonValue = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Validate required keys, then deserialize
    pub fn from_value(value: &JsonValue) -> Result<Self> {
        for key in REQUIRED_CONFIG_KEYS {
            let present = value
                .get(key)
                .and_then(JsonValue::as_str)
                .is_some_and(|s| !s.trim().is_empty());
            if !present {
                return Err(Error::missing_field(*key));
            }
        }

        let config: TapConfig = serde_json::from_value(value.clone())?;
        config.validate()?;
        Ok(config)
    }

    /// Check field formats beyond presence
    fn validate(&self) -> Result<()> {
        if chrono::DateTime::parse_from_rfc3339(&self.start_date).is_err() {
            return Err(Error::InvalidConfigValue {
                field: "start_date".to_string(),
                message: format!("expected UTC ISO-8601 datetime, got '{}'", self.start_date),
            });
        }
        Ok(())
    }
}

/// Rewrite rotated credentials into the config file at `path`
///
/// Reads the file as raw JSON and replaces only the token fields, so keys
/// the tap does not model survive the rewrite. Writes through a temp file
/// and renames for atomicity.
pub async fn rewrite_credentials(
    path: impl AsRef<Path>,
    refresh_token: &str,
    access_token: Option<&str>,
) -> Result<()> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::Config {
            message: format!("Failed to read config file {}: {e}", path.display()),
        })?;

    let mut value: JsonValue = serde_json::from_str(&contents)?;
    let obj = value.as_object_mut().ok_or_else(|| Error::Config {
        message: format!("Config file {} is not a JSON object", path.display()),
    })?;
    obj.insert(
        "refresh_token".to_string(),
        JsonValue::String(refresh_token.to_string()),
    );
    if let Some(token) = access_token {
        obj.insert(
            "access_token".to_string(),
            JsonValue::String(token.to_string()),
        );
    }

    let serialized = serde_json::to_string_pretty(&value)?;
    let temp_path = path.with_extension("tmp");
    tokio::fs::write(&temp_path, &serialized)
        .await
        .map_err(|e| Error::Config {
            message: format!("Failed to write config file: {e}"),
        })?;
    tokio::fs::rename(&temp_path, path)
        .await
        .map_err(|e| Error::Config {
            message: format!("Failed to rename config file: {e}"),
        })?;

    Ok(())
}
