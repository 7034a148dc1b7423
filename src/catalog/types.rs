//! Singer catalog document types
//!
//! Mirrors the catalog JSON shape: stream entries carrying a schema and a
//! list of breadcrumb-addressed metadata objects.

use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A full catalog document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    /// Stream entries, one per discoverable stream
    #[serde(default)]
    pub streams: Vec<CatalogEntry>,
}

impl Catalog {
    /// Load a catalog from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Parse a catalog from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::catalog(format!("invalid catalog: {e}")))
    }

    /// Find the entry for a stream id
    pub fn entry(&self, stream_id: &str) -> Option<&CatalogEntry> {
        self.streams
            .iter()
            .find(|entry| entry.tap_stream_id == stream_id)
    }
}

/// One stream's entry in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Display name, usually equal to the id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<String>,
    /// Unique stream identifier
    pub tap_stream_id: String,
    /// Primary key field names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_properties: Option<Vec<String>>,
    /// JSON schema for the stream's records
    #[serde(default)]
    pub schema: JsonValue,
    /// Breadcrumb-addressed metadata entries
    #[serde(default)]
    pub metadata: Vec<MetadataEntry>,
    /// Legacy entry-level selection flag, honored when no stream-level
    /// metadata carries `selected`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
}

impl CatalogEntry {
    /// Metadata object at the stream level (empty breadcrumb)
    pub fn stream_metadata(&self) -> Option<&JsonObject> {
        self.metadata
            .iter()
            .find(|entry| entry.breadcrumb.is_empty())
            .map(|entry| &entry.metadata)
    }

    /// Metadata object for one schema property
    pub fn field_metadata(&self, field: &str) -> Option<&JsonObject> {
        self.metadata
            .iter()
            .find(|entry| {
                entry.breadcrumb.len() == 2
                    && entry.breadcrumb[0] == "properties"
                    && entry.breadcrumb[1] == field
            })
            .map(|entry| &entry.metadata)
    }

    /// Properties declared by the entry's schema, if it has any
    pub fn schema_properties(&self) -> Option<&JsonObject> {
        self.schema.get("properties").and_then(JsonValue::as_object)
    }
}

/// A single metadata entry addressed by breadcrumb
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataEntry {
    /// `[]` for stream-level, `["properties", <field>]` for field-level
    pub breadcrumb: Vec<String>,
    /// Metadata payload
    pub metadata: JsonObject,
}

impl MetadataEntry {
    /// Stream-level entry
    pub fn stream_level(metadata: JsonObject) -> Self {
        Self {
            breadcrumb: Vec::new(),
            metadata,
        }
    }

    /// Field-level entry for one schema property
    pub fn field_level(field: &str, metadata: JsonObject) -> Self {
        Self {
            breadcrumb: vec!["properties".to_string(), field.to_string()],
            metadata,
        }
    }
}
