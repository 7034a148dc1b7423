//! Error types for tap-helpscout
//!
//! This module defines the error hierarchy for the entire tap.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for tap-helpscout
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Authentication Errors
    // ============================================================================
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    #[error("Token refresh failed: {message}")]
    TokenRefresh { message: String },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Max retries ({max_retries}) exceeded")]
    MaxRetriesExceeded { max_retries: u32 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Data Shape Errors
    // ============================================================================
    #[error("Malformed record in stream '{stream}': {message}")]
    RecordShape { stream: String, message: String },

    // ============================================================================
    // Catalog/State Errors
    // ============================================================================
    #[error("Catalog error: {message}")]
    Catalog { message: String },

    #[error("Stream '{stream}' not found in catalog")]
    StreamNotFound { stream: String },

    #[error("State error: {message}")]
    State { message: String },

    // ============================================================================
    // Output Errors
    // ============================================================================
    #[error("Output error: {message}")]
    Output { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create a token refresh error
    pub fn token_refresh(message: impl Into<String>) -> Self {
        Self::TokenRefresh {
            message: message.into(),
        }
    }

    /// Create an API error carrying the canonical message for the status
    pub fn api(status: u16) -> Self {
        Self::Api {
            status,
            message: status_message(status).to_string(),
        }
    }

    /// Create an API error with the response body appended
    pub fn api_with_body(status: u16, body: &str) -> Self {
        let canonical = status_message(status);
        let message = if body.trim().is_empty() {
            canonical.to_string()
        } else {
            format!("{canonical} ({body})")
        };
        Self::Api { status, message }
    }

    /// Create a record shape error
    pub fn record_shape(stream: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RecordShape {
            stream: stream.into(),
            message: message.into(),
        }
    }

    /// Create a catalog error
    pub fn catalog(message: impl Into<String>) -> Self {
        Self::Catalog {
            message: message.into(),
        }
    }

    /// Create a state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) | Error::RateLimited { .. } | Error::Timeout { .. } => true,
            Error::Api { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }
}

/// Check if an HTTP status code is retryable
///
/// Retries cover rate limiting and the server errors HelpScout emits;
/// 502 is not in the set.
pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 503 | 504)
}

/// Canonical HelpScout error message for an HTTP status code
pub fn status_message(status: u16) -> &'static str {
    match status {
        400 => "Bad Request. Client error - the request doesn't meet all requirements.",
        401 => "Not Authorized. OAuth2 token is either not provided or not valid.",
        403 => "Access denied. Your OAuth2 token is valid, but you are denied access - the response should contain details.",
        404 => "Not Found. Resource was not found - it doesn't exist or it was deleted.",
        409 => "Conflict. Resource cannot be created because conflicting entity already exists.",
        412 => "Precondition failed. The request was well formed and valid, but some other conditions were not met.",
        413 => "Payload Too Large. The request was well formed and valid, but some other conditions were not met.",
        415 => "Unsupported Media Type. The API is unable to work with the provided payload.",
        429 => "Too Many Requests. You reached the rate limit, Please retry after sometime.",
        500 => "Internal Server Error.",
        503 => "Service Unavailable. The API cannot process the request at the moment.",
        504 => "Gateway Timeout. An internal call timed-out and the API was not able to finish your request.",
        _ => "Unexpected HTTP error.",
    }
}

/// Result type alias for tap-helpscout
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
