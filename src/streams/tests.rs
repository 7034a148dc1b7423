//! Registry invariant tests

use super::*;
use serde_json::json;
use std::collections::HashSet;

#[test]
fn test_stream_ids_are_unique() {
    let mut seen = HashSet::new();
    for descriptor in STREAMS {
        assert!(seen.insert(descriptor.id), "duplicate id {}", descriptor.id);
    }
}

#[test]
fn test_expected_stream_count() {
    assert_eq!(STREAMS.len(), 11);
    assert_eq!(top_level_streams().count(), 7);
}

#[test]
fn test_primary_keys_non_empty() {
    for descriptor in STREAMS {
        assert!(
            !descriptor.primary_keys.is_empty(),
            "{} has no primary keys",
            descriptor.id
        );
    }
}

#[test]
fn test_replication_key_only_on_incremental() {
    for descriptor in STREAMS {
        assert_eq!(
            descriptor.replication_key().is_some(),
            descriptor.is_incremental(),
            "{} replication key/mode mismatch",
            descriptor.id
        );
    }
}

#[test]
fn test_parent_child_links_are_symmetric() {
    for descriptor in STREAMS {
        if let Some(parent) = descriptor.parent {
            let parent_descriptor = stream(parent.stream_id)
                .unwrap_or_else(|| panic!("{} names unknown parent", descriptor.id));
            assert!(
                parent_descriptor.child_stream_ids.contains(&descriptor.id),
                "{} missing from {} children",
                descriptor.id,
                parent.stream_id
            );
        }
        for child_id in descriptor.child_stream_ids {
            let child = stream(child_id)
                .unwrap_or_else(|| panic!("{} names unknown child", descriptor.id));
            assert_eq!(
                child.parent.map(|p| p.stream_id),
                Some(descriptor.id),
                "{} does not point back to {}",
                child_id,
                descriptor.id
            );
        }
    }
}

#[test]
fn test_child_paths_have_one_slot() {
    for descriptor in STREAMS {
        let slots = descriptor.endpoint_path.matches("{}").count();
        let expected = usize::from(descriptor.is_child());
        assert_eq!(
            slots, expected,
            "{} has {} path slots",
            descriptor.id, slots
        );
    }
}

#[test]
fn test_resolve_path_substitutes_ids() {
    let threads = stream("conversation_threads").unwrap();
    assert_eq!(
        threads.resolve_path(&json!(42)),
        "/conversations/42/threads"
    );
    assert_eq!(
        threads.resolve_path(&json!("abc")),
        "/conversations/abc/threads"
    );
}

#[test]
fn test_only_report_stream_is_flat() {
    for descriptor in STREAMS {
        let flat = descriptor.envelope == PageEnvelope::Flat;
        assert_eq!(
            flat,
            descriptor.id == "happiness_ratings_report",
            "{} envelope unexpected",
            descriptor.id
        );
        assert_eq!(
            descriptor.date_window_params,
            descriptor.id == "happiness_ratings_report"
        );
    }
}

#[test]
fn test_every_stream_has_a_schema() {
    for descriptor in STREAMS {
        let schema = schema(descriptor.id)
            .unwrap_or_else(|| panic!("{} has no embedded schema", descriptor.id));
        let properties = schema
            .get("properties")
            .and_then(|value| value.as_object())
            .unwrap_or_else(|| panic!("{} schema lacks properties", descriptor.id));

        // Key fields and the cursor must exist in the schema for catalog
        // metadata to force them automatic
        for key in descriptor.primary_keys {
            assert!(
                properties.contains_key(*key),
                "{} schema missing key property {key}",
                descriptor.id
            );
        }
        if let Some(replication_key) = descriptor.replication_key() {
            assert!(
                properties.contains_key(replication_key),
                "{} schema missing replication key",
                descriptor.id
            );
        }
        if let Some(parent) = descriptor.parent {
            assert!(
                properties.contains_key(parent.foreign_key),
                "{} schema missing parent foreign key",
                descriptor.id
            );
        }
    }
}

#[test]
fn test_forced_replication_method_labels() {
    assert_eq!(
        stream("conversations").unwrap().forced_replication_method(),
        "INCREMENTAL"
    );
    assert_eq!(
        stream("conversation_threads")
            .unwrap()
            .forced_replication_method(),
        "FULL_TABLE"
    );
}

#[test]
fn test_bookmark_query_params() {
    assert_eq!(
        stream("conversations").unwrap().bookmark_query_param(),
        Some("modifiedSince")
    );
    assert_eq!(
        stream("customers").unwrap().bookmark_query_param(),
        Some("modifiedSince")
    );
    assert_eq!(stream("mailboxes").unwrap().bookmark_query_param(), None);
    assert_eq!(
        stream("happiness_ratings_report")
            .unwrap()
            .bookmark_query_param(),
        None
    );
}
