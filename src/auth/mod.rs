//! Authentication module
//!
//! OAuth2 refresh-token grant against HelpScout, with token caching and
//! the refresh-token rotation contract.
//!
//! # Overview
//!
//! The auth module provides:
//! - `Authenticator` - Fetches and caches access tokens
//! - `CachedToken` - Token plus expiry, refreshed 60 seconds early
//! - Config file write-back of rotated refresh tokens

mod authenticator;
mod types;

pub use authenticator::{Authenticator, DEFAULT_TOKEN_URL};
pub use types::CachedToken;
