//! Stream-specific post-processing
//!
//! A few streams need fixups after the generic pipeline. Processors are
//! looked up from a registry keyed by stream id, populated once at startup.

use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use std::collections::HashMap;
use std::sync::LazyLock;

/// A post-processor mutates one normalized record
type PostProcessor = fn(&mut JsonObject) -> Result<()>;

/// Registry of per-stream post-processors
static POST_PROCESSORS: LazyLock<HashMap<&'static str, PostProcessor>> = LazyLock::new(|| {
    let mut m: HashMap<&'static str, PostProcessor> = HashMap::new();
    m.insert("conversations", derive_conversation_updated_at);
    m.insert("happiness_ratings_report", rename_rating_identifiers);
    m.insert("team_members", copy_member_user_id);
    m
});

/// Apply the stream's post-processor, if one is registered
pub fn post_process(stream_id: &str, records: &mut [JsonObject]) -> Result<()> {
    if let Some(processor) = POST_PROCESSORS.get(stream_id) {
        for record in records.iter_mut() {
            processor(record)?;
        }
    }
    Ok(())
}

/// Derive the `updated_at` bookmark for conversations as the max of
/// `user_updated_at` and `customer_waiting_since.time`. At least one must
/// be present; fixed-width UTC timestamps make the string max valid.
fn derive_conversation_updated_at(record: &mut JsonObject) -> Result<()> {
    let user_updated_at = record.get("user_updated_at").and_then(JsonValue::as_str);
    let waiting_since = record
        .get("customer_waiting_since")
        .and_then(|value| value.get("time"))
        .and_then(JsonValue::as_str);

    let updated_at = [user_updated_at, waiting_since]
        .into_iter()
        .flatten()
        .max()
        .ok_or_else(|| {
            Error::record_shape(
                "conversations",
                "neither user_updated_at nor customer_waiting_since.time is present",
            )
        })?
        .to_string();

    record.insert("updated_at".to_string(), JsonValue::String(updated_at));
    Ok(())
}

/// The ratings report reuses `id` for the conversation and `threadid` for
/// the thread; rename both to unambiguous fields.
fn rename_rating_identifiers(record: &mut JsonObject) -> Result<()> {
    if let Some(id) = record.remove("id") {
        record.insert("conversation_id".to_string(), id);
    }

    let thread_id = record.remove("threadid").ok_or_else(|| {
        Error::record_shape("happiness_ratings_report", "missing threadid field")
    })?;
    record.insert("thread_id".to_string(), thread_id);
    Ok(())
}

/// Team member rows key on (team_id, user_id); mirror `id` into `user_id`,
/// keeping the original field.
fn copy_member_user_id(record: &mut JsonObject) -> Result<()> {
    let id = record
        .get("id")
        .cloned()
        .ok_or_else(|| Error::record_shape("team_members", "missing id field"))?;
    record.insert("user_id".to_string(), id);
    Ok(())
}
