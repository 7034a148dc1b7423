//! HTTP client module
//!
//! Provides the HelpScout API client with retry, rate limiting, and
//! bearer authentication.
//!
//! # Features
//!
//! - **Automatic Retries**: 429/500/503/504 retry with backoff; 429
//!   honors the `Retry-After` header
//! - **Rate Limiting**: Token bucket rate limiter using governor,
//!   sized for HelpScout's 400 requests per minute
//! - **Backoff Strategies**: Constant, linear, and exponential backoff
//! - **Authentication**: OAuth2 bearer tokens from the auth module

mod client;
mod rate_limit;

pub use client::{HelpScoutClient, HttpClientConfig, RequestConfig, DEFAULT_BASE_URL};
pub use rate_limit::{RateLimiter, RateLimiterConfig, HELPSCOUT_REQUESTS_PER_MINUTE};
