//! Tests for StateStore

use super::*;
use tempfile::tempdir;

// ============================================================================
// Construction Tests
// ============================================================================

#[test]
fn test_store_new() {
    let store = StateStore::new("/tmp/test-state.json");
    assert!(!store.is_in_memory());
    assert_eq!(store.path().to_str().unwrap(), "/tmp/test-state.json");
    assert!(store.state().bookmarks.is_empty());
}

#[test]
fn test_store_in_memory() {
    let store = StateStore::in_memory();
    assert!(store.is_in_memory());
}

#[test]
fn test_from_file_nonexistent_starts_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.json");

    let store = StateStore::from_file(&path).unwrap();
    assert!(store.state().bookmarks.is_empty());
    assert!(store.state().currently_syncing().is_none());
}

#[test]
fn test_from_json() {
    let store = StateStore::from_json(
        r#"{"currently_syncing": "customers",
            "bookmarks": {"customers": "2021-01-05T00:00:00Z"}}"#,
    )
    .unwrap();

    assert!(store.is_in_memory());
    assert_eq!(store.state().currently_syncing(), Some("customers"));
    assert_eq!(
        store.state().get_bookmark("customers"),
        Some("2021-01-05T00:00:00Z")
    );
}

#[test]
fn test_from_json_invalid() {
    let result = StateStore::from_json("{ invalid json }");
    assert!(matches!(result, Err(crate::error::Error::State { .. })));
}

#[test]
fn test_unknown_currently_syncing_discarded() {
    let store = StateStore::from_json(
        r#"{"currently_syncing": "no_such_stream",
            "bookmarks": {"users": "2021-01-01T00:00:00Z"}}"#,
    )
    .unwrap();

    // The marker is dropped; bookmarks survive.
    assert!(store.state().currently_syncing().is_none());
    assert_eq!(
        store.state().get_bookmark("users"),
        Some("2021-01-01T00:00:00Z")
    );
}

// ============================================================================
// Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_save_and_reload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");

    let mut store = StateStore::new(&path);
    store
        .state_mut()
        .set_bookmark("users", "2021-03-01T00:00:00Z".to_string());
    store.state_mut().set_currently_syncing("users");
    store.save().await.unwrap();

    let reloaded = StateStore::from_file(&path).unwrap();
    assert_eq!(
        reloaded.state().get_bookmark("users"),
        Some("2021-03-01T00:00:00Z")
    );
    assert_eq!(reloaded.state().currently_syncing(), Some("users"));
}

#[tokio::test]
async fn test_save_in_memory_noop() {
    let mut store = StateStore::in_memory();
    store
        .state_mut()
        .set_bookmark("users", "2021-01-01T00:00:00Z".to_string());

    store.save().await.unwrap();
}

#[tokio::test]
async fn test_save_overwrites_previous_contents() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");
    tokio::fs::write(&path, r#"{"bookmarks": {"users": "2020-01-01T00:00:00Z"}}"#)
        .await
        .unwrap();

    let mut store = StateStore::from_file(&path).unwrap();
    store
        .state_mut()
        .advance_bookmark("users", "2021-06-01T00:00:00Z");
    store.save().await.unwrap();

    let reloaded = StateStore::from_file(&path).unwrap();
    assert_eq!(
        reloaded.state().get_bookmark("users"),
        Some("2021-06-01T00:00:00Z")
    );
}

#[test]
fn test_from_file_invalid_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("invalid.json");
    std::fs::write(&path, "{ invalid json }").unwrap();

    let result = StateStore::from_file(&path);
    assert!(result.is_err());
}
