//! Normalization primitives
//!
//! Pure transformations over raw API pages. Each page is reduced to the rows
//! under its data key, cleaned of hypermedia markers, and re-keyed to
//! snake_case before the per-stream post-processors run.

use super::post_process::post_process;
use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use regex::Regex;
use std::sync::LazyLock;

/// First conversion pass: split before a capital that starts a lowercase run
static CAMEL_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(.)([A-Z][a-z]+)").unwrap());

/// Second conversion pass: split between a lowercase/digit and a capital
static CAMEL_TAIL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([a-z0-9])([A-Z])").unwrap());

/// `_embedded` sub-resources promoted onto their parent record.
///
/// Matched against the snake_cased node name, so both raw `socialProfiles`
/// and pre-converted `social_profiles` qualify.
const EMBEDDED_NODES: &[&str] = &[
    "attachments",
    "address",
    "chats",
    "emails",
    "phones",
    "social_profiles",
    "websites",
    "properties",
];

/// Reserved hypermedia keys removed at every nesting depth
const HYPERMEDIA_KEYS: &[&str] = &["_embedded", "_links"];

/// Convert a camelCase name to snake_case.
///
/// Two passes: `ABCWord` splits as `abc_word` while `wordABC` splits as
/// `word_abc`, which a single pass cannot produce. Idempotent on names that
/// are already snake_case.
pub fn convert(name: &str) -> String {
    let pass_one = CAMEL_RUN.replace_all(name, "${1}_${2}");
    let pass_two = CAMEL_TAIL.replace_all(&pass_one, "${1}_${2}");
    pass_two.to_lowercase()
}

/// Recursively convert every object key to snake_case
pub fn convert_keys(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(map) => {
            let converted = map
                .into_iter()
                .map(|(key, val)| (convert(&key), convert_keys(val)))
                .collect();
            JsonValue::Object(converted)
        }
        JsonValue::Array(items) => {
            JsonValue::Array(items.into_iter().map(convert_keys).collect())
        }
        other => other,
    }
}

/// Recursively delete hypermedia marker keys from objects and arrays
pub fn strip_hypermedia(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(map) => {
            let stripped = map
                .into_iter()
                .filter(|(key, _)| !HYPERMEDIA_KEYS.contains(&key.as_str()))
                .map(|(key, val)| (key, strip_hypermedia(val)))
                .collect();
            JsonValue::Object(stripped)
        }
        JsonValue::Array(items) => {
            JsonValue::Array(items.into_iter().map(strip_hypermedia).collect())
        }
        other => other,
    }
}

/// Promote allow-listed `_embedded` sub-resources to direct record fields,
/// overwriting any same-named top-level field. The `_embedded` container
/// itself is left in place for the strip pass to remove.
pub fn denest_embedded(record: &mut JsonObject) {
    let promoted: Vec<(String, JsonValue)> = match record.get("_embedded") {
        Some(JsonValue::Object(embedded)) => embedded
            .iter()
            .filter(|(key, _)| EMBEDDED_NODES.contains(&convert(key).as_str()))
            .map(|(key, val)| (key.clone(), val.clone()))
            .collect(),
        _ => return,
    };

    for (key, value) in promoted {
        record.insert(key, value);
    }
}

/// Run the full pipeline over the rows of one page
pub fn normalize_records(rows: Vec<JsonValue>, stream_id: &str) -> Result<Vec<JsonObject>> {
    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let JsonValue::Object(mut record) = row else {
            return Err(Error::record_shape(
                stream_id,
                "expected a JSON object record",
            ));
        };
        denest_embedded(&mut record);
        let flat: JsonObject = record
            .into_iter()
            .filter(|(key, _)| !HYPERMEDIA_KEYS.contains(&key.as_str()))
            .map(|(key, val)| (convert(&key), convert_keys(strip_hypermedia(val))))
            .collect();
        records.push(flat);
    }
    post_process(stream_id, &mut records)?;
    Ok(records)
}

/// Normalize a page whose rows live under `_embedded.<data_key>`.
///
/// A page with no `_embedded` container (or no collection under the data
/// key) yields an empty sequence, not an error; empty trailing pages are
/// normal.
pub fn normalize_embedded_page(
    page: &JsonValue,
    data_key: &str,
    stream_id: &str,
) -> Result<Vec<JsonObject>> {
    let rows = page
        .get("_embedded")
        .and_then(|embedded| embedded.get(data_key))
        .and_then(JsonValue::as_array)
        .cloned()
        .unwrap_or_default();
    normalize_records(rows, stream_id)
}

/// Normalize a page whose rows live under a top-level `<data_key>` field
/// (the reports endpoints skip the `_embedded` wrapper).
pub fn normalize_flat_page(
    page: &JsonValue,
    data_key: &str,
    stream_id: &str,
) -> Result<Vec<JsonObject>> {
    let rows = page
        .get(data_key)
        .and_then(JsonValue::as_array)
        .cloned()
        .unwrap_or_default();
    normalize_records(rows, stream_id)
}
