//! Stream and field selection resolution
//!
//! Turns a raw catalog into the per-run selection plan: which streams sync,
//! which fields each emitted record keeps, and the schema announced for
//! each stream.

use super::types::{Catalog, CatalogEntry};
use crate::error::Result;
use crate::streams::{self, StreamDescriptor, STREAMS};
use crate::types::{JsonObject, JsonValue};
use std::collections::HashMap;
use tracing::warn;

/// Field inclusion level from catalog metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldInclusion {
    /// Always emitted; selection cannot turn these off
    Automatic,
    /// Emitted unless explicitly deselected
    Available,
    /// Never emitted, even if selected
    Unsupported,
}

impl FieldInclusion {
    fn parse(value: Option<&str>) -> Self {
        match value {
            Some("automatic") => Self::Automatic,
            Some("unsupported") => Self::Unsupported,
            _ => Self::Available,
        }
    }
}

/// Resolved emission rule for one schema property
#[derive(Debug, Clone)]
pub struct FieldRule {
    /// Inclusion level, after forcing key fields to automatic
    pub inclusion: FieldInclusion,
    /// Explicit selection flag from the catalog, if any
    pub selected: Option<bool>,
}

impl FieldRule {
    /// Whether a field governed by this rule lands in emitted records
    pub fn emits(&self) -> bool {
        match self.inclusion {
            FieldInclusion::Automatic => true,
            FieldInclusion::Unsupported => false,
            FieldInclusion::Available => self.selected != Some(false),
        }
    }
}

/// Per-stream selection plan
#[derive(Debug, Clone)]
pub struct StreamSelection {
    /// Schema announced before the stream's first record
    pub schema: JsonValue,
    fields: HashMap<String, FieldRule>,
}

impl StreamSelection {
    /// Emission rule for a property, if the schema declares it
    pub fn field(&self, name: &str) -> Option<&FieldRule> {
        self.fields.get(name)
    }

    /// Apply field selection to a normalized record.
    ///
    /// A field survives only when the schema declares it and its rule
    /// allows emission; everything else is dropped.
    pub fn filter_record(&self, record: JsonObject) -> JsonObject {
        record
            .into_iter()
            .filter(|(name, _)| self.fields.get(name).is_some_and(FieldRule::emits))
            .collect()
    }
}

/// Resolved catalog selection for one run
#[derive(Debug, Clone, Default)]
pub struct Selection {
    selected: Vec<String>,
    streams: HashMap<String, StreamSelection>,
}

impl Selection {
    /// Selected stream ids, in registry order
    pub fn selected_streams(&self) -> &[String] {
        &self.selected
    }

    /// Whether a stream takes part in this run
    pub fn is_selected(&self, stream_id: &str) -> bool {
        self.selected.iter().any(|id| id == stream_id)
    }

    /// Selection plan for a stream
    pub fn stream(&self, stream_id: &str) -> Option<&StreamSelection> {
        self.streams.get(stream_id)
    }
}

/// Resolve a catalog into a selection plan.
///
/// Streams the registry does not know are ignored with a warning.
/// Primary-key and replication-key fields are forced to automatic
/// inclusion no matter what the catalog says.
pub fn resolve(catalog: &Catalog) -> Result<Selection> {
    let mut chosen: Vec<&str> = Vec::new();
    let mut stream_plans = HashMap::new();

    for entry in &catalog.streams {
        let Some(descriptor) = streams::stream(&entry.tap_stream_id) else {
            warn!(stream = %entry.tap_stream_id, "ignoring unknown stream in catalog");
            continue;
        };
        if entry_selected(entry) {
            chosen.push(descriptor.id);
        }
        stream_plans.insert(descriptor.id.to_string(), resolve_stream(descriptor, entry));
    }

    // Catalog order is not trusted; sync order comes from the registry.
    let selected = STREAMS
        .iter()
        .filter(|descriptor| chosen.contains(&descriptor.id))
        .map(|descriptor| descriptor.id.to_string())
        .collect();

    Ok(Selection {
        selected,
        streams: stream_plans,
    })
}

fn entry_selected(entry: &CatalogEntry) -> bool {
    entry
        .stream_metadata()
        .and_then(|metadata| metadata.get("selected"))
        .and_then(JsonValue::as_bool)
        .or(entry.selected)
        .unwrap_or(false)
}

fn resolve_stream(descriptor: &StreamDescriptor, entry: &CatalogEntry) -> StreamSelection {
    // Entries without a usable schema fall back to the discovered one.
    let schema = match entry.schema_properties() {
        Some(_) => entry.schema.clone(),
        None => streams::schema(descriptor.id)
            .cloned()
            .unwrap_or(JsonValue::Null),
    };

    let mut fields = HashMap::new();
    if let Some(properties) = schema.get("properties").and_then(JsonValue::as_object) {
        for name in properties.keys() {
            fields.insert(name.clone(), resolve_field(descriptor, entry, name));
        }
    }

    StreamSelection { schema, fields }
}

fn resolve_field(descriptor: &StreamDescriptor, entry: &CatalogEntry, name: &str) -> FieldRule {
    let forced = descriptor.primary_keys.iter().any(|pk| *pk == name)
        || descriptor.replication_key() == Some(name)
        || descriptor
            .parent
            .is_some_and(|parent| parent.foreign_key == name);

    let metadata = entry.field_metadata(name);
    let inclusion = if forced {
        FieldInclusion::Automatic
    } else {
        FieldInclusion::parse(
            metadata
                .and_then(|m| m.get("inclusion"))
                .and_then(JsonValue::as_str),
        )
    };
    let selected = metadata
        .and_then(|m| m.get("selected"))
        .and_then(JsonValue::as_bool);

    FieldRule {
        inclusion,
        selected,
    }
}
