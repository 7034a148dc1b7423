//! Catalog discovery
//!
//! Builds the catalog document a sync run consumes: one entry per registry
//! stream carrying its schema, key properties, and Singer metadata. Streams
//! are not selected by default; the operator marks selections in the
//! emitted catalog before running a sync.

use crate::catalog::{Catalog, CatalogEntry, MetadataEntry};
use crate::error::{Error, Result};
use crate::streams::{self, StreamDescriptor, STREAMS};
use crate::types::{JsonObject, JsonValue};
use serde_json::json;

/// Build the full catalog from the stream registry.
pub fn discover() -> Result<Catalog> {
    let mut entries = Vec::with_capacity(STREAMS.len());
    for descriptor in STREAMS {
        entries.push(catalog_entry(descriptor)?);
    }
    Ok(Catalog { streams: entries })
}

fn catalog_entry(descriptor: &StreamDescriptor) -> Result<CatalogEntry> {
    let schema = streams::schema(descriptor.id)
        .cloned()
        .ok_or_else(|| Error::catalog(format!("no schema for stream '{}'", descriptor.id)))?;

    let mut metadata = vec![MetadataEntry::stream_level(stream_metadata(descriptor))];
    if let Some(properties) = schema.get("properties").and_then(JsonValue::as_object) {
        for name in properties.keys() {
            metadata.push(MetadataEntry::field_level(
                name,
                field_metadata(descriptor, name),
            ));
        }
    }

    Ok(CatalogEntry {
        stream: Some(descriptor.id.to_string()),
        tap_stream_id: descriptor.id.to_string(),
        key_properties: Some(
            descriptor
                .primary_keys
                .iter()
                .map(|key| (*key).to_string())
                .collect(),
        ),
        schema,
        metadata,
        selected: None,
    })
}

fn stream_metadata(descriptor: &StreamDescriptor) -> JsonObject {
    let mut metadata = JsonObject::new();
    metadata.insert("inclusion".to_string(), json!("available"));
    metadata.insert(
        "table-key-properties".to_string(),
        json!(descriptor.primary_keys),
    );
    metadata.insert(
        "forced-replication-method".to_string(),
        json!(descriptor.forced_replication_method()),
    );
    if let Some(key) = descriptor.replication_key() {
        metadata.insert("valid-replication-keys".to_string(), json!([key]));
    }
    metadata
}

/// Key fields and cursors cannot be deselected; everything else can.
fn field_metadata(descriptor: &StreamDescriptor, name: &str) -> JsonObject {
    let automatic = descriptor.primary_keys.iter().any(|pk| *pk == name)
        || descriptor.replication_key() == Some(name)
        || descriptor
            .parent
            .is_some_and(|parent| parent.foreign_key == name);

    let mut metadata = JsonObject::new();
    let inclusion = if automatic { "automatic" } else { "available" };
    metadata.insert("inclusion".to_string(), json!(inclusion));
    metadata
}
