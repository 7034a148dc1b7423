//! State types for tracking sync progress
//!
//! The state blob is serialized to JSON, emitted after every change, and
//! read back on the next run to resume.

use crate::error::Result;
use crate::types::JsonValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complete persisted state for a run
///
/// Wire shape: `{"currently_syncing": "customers", "bookmarks":
/// {"conversations": "2021-01-01T00:00:00Z"}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapState {
    /// Stream in progress when state was last written; absent after a
    /// clean completion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currently_syncing: Option<String>,

    /// Per-stream cursor values
    #[serde(default)]
    pub bookmarks: BTreeMap<String, String>,
}

impl TapState {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Cursor value for a stream
    pub fn get_bookmark(&self, stream: &str) -> Option<&str> {
        self.bookmarks.get(stream).map(String::as_str)
    }

    /// Overwrite a stream's cursor
    pub fn set_bookmark(&mut self, stream: &str, cursor: String) {
        self.bookmarks.insert(stream.to_string(), cursor);
    }

    /// Move a stream's cursor forward, never backward.
    ///
    /// Cursors are fixed-width UTC ISO-8601 strings, so lexicographic
    /// comparison orders them correctly. Returns whether the stored value
    /// changed.
    pub fn advance_bookmark(&mut self, stream: &str, candidate: &str) -> bool {
        match self.bookmarks.get(stream) {
            Some(stored) if stored.as_str() >= candidate => false,
            _ => {
                self.bookmarks
                    .insert(stream.to_string(), candidate.to_string());
                true
            }
        }
    }

    /// Stream marked as in progress, if any
    pub fn currently_syncing(&self) -> Option<&str> {
        self.currently_syncing.as_deref()
    }

    /// Mark a stream as in progress
    pub fn set_currently_syncing(&mut self, stream: &str) {
        self.currently_syncing = Some(stream.to_string());
    }

    /// Clear the in-progress marker
    pub fn clear_currently_syncing(&mut self) {
        self.currently_syncing = None;
    }

    /// The full state as a JSON value, for STATE messages
    pub fn to_value(&self) -> Result<JsonValue> {
        Ok(serde_json::to_value(self)?)
    }
}
