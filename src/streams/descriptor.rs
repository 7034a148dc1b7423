//! Stream descriptor types
//!
//! Static, declarative metadata for each HelpScout entity type. Descriptors
//! never change at runtime; the registry in `registry.rs` holds one per
//! stream.

use crate::types::JsonValue;

/// How a stream replicates across runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplicationMode {
    /// Cursor-filtered replication; only records at or past the bookmark
    /// are emitted and the max observed cursor becomes the new bookmark.
    Incremental {
        /// Record field holding the cursor value
        replication_key: &'static str,
        /// Query parameter used to request "changed since", when the
        /// endpoint supports server-side filtering
        bookmark_query_param: Option<&'static str>,
    },
    /// Every record is emitted on every run; no bookmark is kept
    FullTable,
}

/// Where a page keeps its rows and pagination counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEnvelope {
    /// Rows under `_embedded.<data_key>`, counters under
    /// `page.number`/`page.totalPages` (most endpoints)
    Embedded,
    /// Rows under a top-level `<data_key>`, counters under top-level
    /// `page`/`pages` (the reports endpoints)
    Flat,
}

/// Back-reference from a child stream to its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentLink {
    /// Registry id of the parent stream
    pub stream_id: &'static str,
    /// Field name the parent id is injected under (e.g. `mailbox_id`)
    pub foreign_key: &'static str,
}

/// Static metadata for one stream
#[derive(Debug, Clone, Copy)]
pub struct StreamDescriptor {
    /// Unique registry key, also the Singer `tap_stream_id`
    pub id: &'static str,
    /// Endpoint path; children carry one `{}` slot for the parent id
    pub endpoint_path: &'static str,
    /// Primary key fields, composite allowed
    pub primary_keys: &'static [&'static str],
    /// Replication behavior
    pub replication: ReplicationMode,
    /// Collection field holding the rows inside a page
    pub data_key: &'static str,
    /// Page envelope shape
    pub envelope: PageEnvelope,
    /// Child streams synced from this stream's record ids, in order
    pub child_stream_ids: &'static [&'static str],
    /// Present iff this stream is a child
    pub parent: Option<ParentLink>,
    /// Constant query parameters sent on every request
    pub static_query_params: &'static [(&'static str, &'static str)],
    /// Send `start`/`end` window parameters built from the cursor
    pub date_window_params: bool,
}

impl StreamDescriptor {
    /// Replication key field, when incremental
    pub fn replication_key(&self) -> Option<&'static str> {
        match self.replication {
            ReplicationMode::Incremental {
                replication_key, ..
            } => Some(replication_key),
            ReplicationMode::FullTable => None,
        }
    }

    /// Query parameter used for server-side cursor filtering, if any
    pub fn bookmark_query_param(&self) -> Option<&'static str> {
        match self.replication {
            ReplicationMode::Incremental {
                bookmark_query_param,
                ..
            } => bookmark_query_param,
            ReplicationMode::FullTable => None,
        }
    }

    /// Whether the stream replicates incrementally
    pub fn is_incremental(&self) -> bool {
        matches!(self.replication, ReplicationMode::Incremental { .. })
    }

    /// Whether the stream is synced per parent id
    pub fn is_child(&self) -> bool {
        self.parent.is_some()
    }

    /// Whether the stream dispatches child streams
    pub fn has_children(&self) -> bool {
        !self.child_stream_ids.is_empty()
    }

    /// Singer `forced-replication-method` value
    pub fn forced_replication_method(&self) -> &'static str {
        match self.replication {
            ReplicationMode::Incremental { .. } => "INCREMENTAL",
            ReplicationMode::FullTable => "FULL_TABLE",
        }
    }

    /// Substitute a parent id into the endpoint path template
    pub fn resolve_path(&self, parent_id: &JsonValue) -> String {
        let id = match parent_id {
            JsonValue::String(s) => s.clone(),
            other => other.to_string(),
        };
        self.endpoint_path.replace("{}", &id)
    }
}
