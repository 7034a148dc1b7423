//! Singer protocol messages
//!
//! The three message types a tap writes to stdout, one JSON document per
//! line: SCHEMA announces a stream's shape, RECORD carries one extracted
//! row, STATE snapshots the bookmarks for downstream resume.

use crate::error::Result;
use crate::types::JsonValue;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A message emitted on the Singer stdout stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    /// Stream schema announcement, written before the stream's records
    #[serde(rename = "SCHEMA")]
    Schema {
        /// Stream name
        stream: String,
        /// JSON Schema describing the records
        schema: JsonValue,
        /// Primary key fields
        key_properties: Vec<String>,
        /// Bookmark fields, when the producer declares them
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bookmark_properties: Option<Vec<String>>,
    },
    /// One extracted record
    #[serde(rename = "RECORD")]
    Record {
        /// Stream name
        stream: String,
        /// The record payload
        record: JsonValue,
        /// Extraction timestamp (UTC RFC 3339 with microseconds)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time_extracted: Option<String>,
    },
    /// Bookmark snapshot
    #[serde(rename = "STATE")]
    State {
        /// The full state value
        value: JsonValue,
    },
}

impl Message {
    /// Create a schema message
    pub fn schema(
        stream: impl Into<String>,
        schema: JsonValue,
        key_properties: &[&str],
        bookmark_properties: Option<&[&str]>,
    ) -> Self {
        Self::Schema {
            stream: stream.into(),
            schema,
            key_properties: key_properties.iter().map(ToString::to_string).collect(),
            bookmark_properties: bookmark_properties
                .map(|keys| keys.iter().map(ToString::to_string).collect()),
        }
    }

    /// Create a record message stamped with the extraction time
    pub fn record(
        stream: impl Into<String>,
        record: JsonValue,
        time_extracted: DateTime<Utc>,
    ) -> Self {
        Self::Record {
            stream: stream.into(),
            record,
            time_extracted: Some(time_extracted.to_rfc3339_opts(SecondsFormat::Micros, true)),
        }
    }

    /// Create a state message
    pub fn state(value: JsonValue) -> Self {
        Self::State { value }
    }

    /// Check if this is a schema message
    pub fn is_schema(&self) -> bool {
        matches!(self, Self::Schema { .. })
    }

    /// Check if this is a record message
    pub fn is_record(&self) -> bool {
        matches!(self, Self::Record { .. })
    }

    /// Check if this is a state message
    pub fn is_state(&self) -> bool {
        matches!(self, Self::State { .. })
    }

    /// Stream name, for the message kinds that carry one
    pub fn stream(&self) -> Option<&str> {
        match self {
            Self::Schema { stream, .. } | Self::Record { stream, .. } => Some(stream),
            Self::State { .. } => None,
        }
    }

    /// Serialize to a single JSON line (without the trailing newline)
    pub fn to_json_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
