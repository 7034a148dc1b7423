//! State management module
//!
//! Handles bookmark tracking, the currently-syncing checkpoint, and
//! resumability. State is persisted between runs to keep syncs
//! incremental.
//!
//! # Overview
//!
//! The state module provides:
//! - `TapState` - Bookmarks plus the currently-syncing marker
//! - `StateStore` - File-backed loading and atomic write-back

mod store;
mod types;

pub use store::StateStore;
pub use types::TapState;

#[cfg(test)]
mod store_tests;
