//! Stream registry
//!
//! Every HelpScout stream the tap knows about, in sync order, plus the JSON
//! schemas embedded in the binary.

use super::descriptor::{PageEnvelope, ParentLink, ReplicationMode, StreamDescriptor};
use crate::types::JsonValue;
use std::collections::HashMap;
use std::sync::LazyLock;

/// All streams, in the order the orchestrator visits them.
///
/// Children immediately follow their parent but are only ever synced through
/// the parent's record ids, never as top-level iterations.
pub static STREAMS: &[StreamDescriptor] = &[
    StreamDescriptor {
        id: "conversations",
        endpoint_path: "/conversations",
        primary_keys: &["id"],
        replication: ReplicationMode::Incremental {
            replication_key: "updated_at",
            bookmark_query_param: Some("modifiedSince"),
        },
        data_key: "conversations",
        envelope: PageEnvelope::Embedded,
        child_stream_ids: &["conversation_threads"],
        parent: None,
        static_query_params: &[
            ("status", "all"),
            ("sortField", "modifiedAt"),
            ("sortOrder", "asc"),
        ],
        date_window_params: false,
    },
    StreamDescriptor {
        id: "conversation_threads",
        endpoint_path: "/conversations/{}/threads",
        primary_keys: &["id"],
        replication: ReplicationMode::FullTable,
        data_key: "threads",
        envelope: PageEnvelope::Embedded,
        child_stream_ids: &[],
        parent: Some(ParentLink {
            stream_id: "conversations",
            foreign_key: "conversation_id",
        }),
        static_query_params: &[],
        date_window_params: false,
    },
    StreamDescriptor {
        id: "customers",
        endpoint_path: "/customers",
        primary_keys: &["id"],
        replication: ReplicationMode::Incremental {
            replication_key: "updated_at",
            bookmark_query_param: Some("modifiedSince"),
        },
        data_key: "customers",
        envelope: PageEnvelope::Embedded,
        child_stream_ids: &[],
        parent: None,
        static_query_params: &[("sortField", "modifiedAt"), ("sortOrder", "asc")],
        date_window_params: false,
    },
    StreamDescriptor {
        id: "mailboxes",
        endpoint_path: "/mailboxes",
        primary_keys: &["id"],
        replication: ReplicationMode::Incremental {
            replication_key: "updated_at",
            bookmark_query_param: None,
        },
        data_key: "mailboxes",
        envelope: PageEnvelope::Embedded,
        child_stream_ids: &["mailbox_fields", "mailbox_folders"],
        parent: None,
        static_query_params: &[],
        date_window_params: false,
    },
    StreamDescriptor {
        id: "mailbox_fields",
        endpoint_path: "/mailboxes/{}/fields",
        primary_keys: &["id"],
        replication: ReplicationMode::FullTable,
        data_key: "fields",
        envelope: PageEnvelope::Embedded,
        child_stream_ids: &[],
        parent: Some(ParentLink {
            stream_id: "mailboxes",
            foreign_key: "mailbox_id",
        }),
        static_query_params: &[],
        date_window_params: false,
    },
    StreamDescriptor {
        id: "mailbox_folders",
        endpoint_path: "/mailboxes/{}/folders",
        primary_keys: &["id"],
        replication: ReplicationMode::Incremental {
            replication_key: "updated_at",
            bookmark_query_param: None,
        },
        data_key: "folders",
        envelope: PageEnvelope::Embedded,
        child_stream_ids: &[],
        parent: Some(ParentLink {
            stream_id: "mailboxes",
            foreign_key: "mailbox_id",
        }),
        static_query_params: &[],
        date_window_params: false,
    },
    StreamDescriptor {
        id: "teams",
        endpoint_path: "/teams",
        primary_keys: &["id"],
        replication: ReplicationMode::Incremental {
            replication_key: "updated_at",
            bookmark_query_param: None,
        },
        data_key: "teams",
        envelope: PageEnvelope::Embedded,
        child_stream_ids: &["team_members"],
        parent: None,
        static_query_params: &[],
        date_window_params: false,
    },
    StreamDescriptor {
        id: "team_members",
        endpoint_path: "/teams/{}/members",
        primary_keys: &["team_id", "user_id"],
        replication: ReplicationMode::FullTable,
        data_key: "users",
        envelope: PageEnvelope::Embedded,
        child_stream_ids: &[],
        parent: Some(ParentLink {
            stream_id: "teams",
            foreign_key: "team_id",
        }),
        static_query_params: &[],
        date_window_params: false,
    },
    StreamDescriptor {
        id: "users",
        endpoint_path: "/users",
        primary_keys: &["id"],
        replication: ReplicationMode::Incremental {
            replication_key: "updated_at",
            bookmark_query_param: None,
        },
        data_key: "users",
        envelope: PageEnvelope::Embedded,
        child_stream_ids: &[],
        parent: None,
        static_query_params: &[],
        date_window_params: false,
    },
    StreamDescriptor {
        id: "workflows",
        endpoint_path: "/workflows",
        primary_keys: &["id"],
        replication: ReplicationMode::Incremental {
            replication_key: "modified_at",
            bookmark_query_param: None,
        },
        data_key: "workflows",
        envelope: PageEnvelope::Embedded,
        child_stream_ids: &[],
        parent: None,
        static_query_params: &[],
        date_window_params: false,
    },
    StreamDescriptor {
        id: "happiness_ratings_report",
        endpoint_path: "/reports/happiness/ratings",
        primary_keys: &["rating_customer_id", "conversation_id", "rating_created_at"],
        replication: ReplicationMode::FullTable,
        data_key: "results",
        envelope: PageEnvelope::Flat,
        child_stream_ids: &[],
        parent: None,
        static_query_params: &[],
        date_window_params: true,
    },
];

/// JSON schemas embedded in the binary, keyed by stream id
pub static SCHEMAS: LazyLock<HashMap<&'static str, JsonValue>> = LazyLock::new(|| {
    let mut m = HashMap::new();
    m.insert(
        "conversations",
        parse_schema(include_str!("../schemas/conversations.json")),
    );
    m.insert(
        "conversation_threads",
        parse_schema(include_str!("../schemas/conversation_threads.json")),
    );
    m.insert(
        "customers",
        parse_schema(include_str!("../schemas/customers.json")),
    );
    m.insert(
        "mailboxes",
        parse_schema(include_str!("../schemas/mailboxes.json")),
    );
    m.insert(
        "mailbox_fields",
        parse_schema(include_str!("../schemas/mailbox_fields.json")),
    );
    m.insert(
        "mailbox_folders",
        parse_schema(include_str!("../schemas/mailbox_folders.json")),
    );
    m.insert("teams", parse_schema(include_str!("../schemas/teams.json")));
    m.insert(
        "team_members",
        parse_schema(include_str!("../schemas/team_members.json")),
    );
    m.insert("users", parse_schema(include_str!("../schemas/users.json")));
    m.insert(
        "workflows",
        parse_schema(include_str!("../schemas/workflows.json")),
    );
    m.insert(
        "happiness_ratings_report",
        parse_schema(include_str!("../schemas/happiness_ratings_report.json")),
    );
    m
});

fn parse_schema(raw: &str) -> JsonValue {
    serde_json::from_str(raw).expect("embedded schema is valid JSON")
}

/// Look up a stream descriptor by id
pub fn stream(id: &str) -> Option<&'static StreamDescriptor> {
    STREAMS.iter().find(|descriptor| descriptor.id == id)
}

/// Look up an embedded schema by stream id
pub fn schema(id: &str) -> Option<&'static JsonValue> {
    SCHEMAS.get(id)
}

/// Top-level streams (those not synced through a parent), in sync order
pub fn top_level_streams() -> impl Iterator<Item = &'static StreamDescriptor> {
    STREAMS.iter().filter(|descriptor| !descriptor.is_child())
}
