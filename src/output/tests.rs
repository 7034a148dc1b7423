//! Tests for the output module

use super::*;
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;

// ============================================================================
// Message Serialization Tests
// ============================================================================

#[test]
fn test_schema_message_serialization() {
    let message = Message::schema(
        "mailboxes",
        json!({"type": "object", "properties": {"id": {"type": ["null", "integer"]}}}),
        &["id"],
        None,
    );

    let value: serde_json::Value = serde_json::from_str(&message.to_json_line().unwrap()).unwrap();
    assert_eq!(value["type"], json!("SCHEMA"));
    assert_eq!(value["stream"], json!("mailboxes"));
    assert_eq!(value["key_properties"], json!(["id"]));
    assert_eq!(value["schema"]["type"], json!("object"));
    // Absent bookmark_properties stays off the wire
    assert!(value.get("bookmark_properties").is_none());
}

#[test]
fn test_schema_message_with_bookmark_properties() {
    let message = Message::schema("conversations", json!({}), &["id"], Some(&["user_updated_at"]));

    let value: serde_json::Value = serde_json::from_str(&message.to_json_line().unwrap()).unwrap();
    assert_eq!(value["bookmark_properties"], json!(["user_updated_at"]));
}

#[test]
fn test_record_message_serialization() {
    let extracted = Utc.with_ymd_and_hms(2021, 1, 2, 3, 4, 5).unwrap();
    let message = Message::record(
        "customers",
        json!({"id": 7, "first_name": "Ada"}),
        extracted,
    );

    let value: serde_json::Value = serde_json::from_str(&message.to_json_line().unwrap()).unwrap();
    assert_eq!(value["type"], json!("RECORD"));
    assert_eq!(value["stream"], json!("customers"));
    assert_eq!(value["record"]["id"], json!(7));
    assert_eq!(value["time_extracted"], json!("2021-01-02T03:04:05.000000Z"));
}

#[test]
fn test_state_message_serialization() {
    let message = Message::state(json!({
        "currently_syncing": "customers",
        "bookmarks": {"conversations": "2021-06-01T00:00:00Z"}
    }));

    let value: serde_json::Value = serde_json::from_str(&message.to_json_line().unwrap()).unwrap();
    assert_eq!(value["type"], json!("STATE"));
    assert_eq!(value["value"]["currently_syncing"], json!("customers"));
}

#[test]
fn test_record_message_round_trip() {
    let line = r#"{"type":"RECORD","stream":"users","record":{"id":1},"time_extracted":"2021-01-01T00:00:00.000000Z"}"#;
    let message: Message = serde_json::from_str(line).unwrap();

    assert!(message.is_record());
    assert_eq!(message.stream(), Some("users"));
}

#[test]
fn test_message_to_json_line_is_single_line() {
    let message = Message::schema(
        "customers",
        json!({"properties": {"address": {"properties": {"lines": {"type": ["null", "array"]}}}}}),
        &["id"],
        None,
    );

    let line = message.to_json_line().unwrap();
    assert!(!line.contains('\n'));
}

#[test]
fn test_message_predicates() {
    let schema = Message::schema("teams", json!({}), &["id"], None);
    let record = Message::record("teams", json!({"id": 1}), Utc::now());
    let state = Message::state(json!({}));

    assert!(schema.is_schema() && !schema.is_record() && !schema.is_state());
    assert!(record.is_record());
    assert!(state.is_state());
    assert_eq!(state.stream(), None);
}

// ============================================================================
// RecordingEmitter Tests
// ============================================================================

#[test]
fn test_recording_emitter_collects_in_order() {
    let mut emitter = RecordingEmitter::new();
    assert!(emitter.is_empty());

    emitter
        .write_schema("mailboxes", json!({}), &["id"], None)
        .unwrap();
    emitter
        .write_record("mailboxes", json!({"id": 1}), Utc::now())
        .unwrap();
    emitter
        .write_record("mailboxes", json!({"id": 2}), Utc::now())
        .unwrap();
    emitter.write_state(json!({"bookmarks": {}})).unwrap();

    assert_eq!(emitter.len(), 4);
    assert!(emitter.messages()[0].is_schema());
    assert!(emitter.messages()[3].is_state());
}

#[test]
fn test_recording_emitter_records_for_stream() {
    let mut emitter = RecordingEmitter::new();
    emitter
        .write_record("mailboxes", json!({"id": 1}), Utc::now())
        .unwrap();
    emitter
        .write_record("users", json!({"id": 9}), Utc::now())
        .unwrap();
    emitter
        .write_record("mailboxes", json!({"id": 2}), Utc::now())
        .unwrap();

    let records = emitter.records_for("mailboxes");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["id"], json!(1));
    assert_eq!(records[1]["id"], json!(2));
    assert_eq!(emitter.records_for("users").len(), 1);
    assert_eq!(emitter.records_for("teams").len(), 0);
}

#[test]
fn test_recording_emitter_schema_count_and_states() {
    let mut emitter = RecordingEmitter::new();
    emitter
        .write_schema("customers", json!({}), &["id"], None)
        .unwrap();
    emitter.write_state(json!({"a": 1})).unwrap();
    emitter.write_state(json!({"a": 2})).unwrap();

    assert_eq!(emitter.schema_count("customers"), 1);
    assert_eq!(emitter.schema_count("users"), 0);

    let states = emitter.states();
    assert_eq!(states.len(), 2);
    assert_eq!(states[1]["a"], json!(2));
}
