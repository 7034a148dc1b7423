//! Sync types
//!
//! Context and summary types for the orchestrator.

use crate::config::TapConfig;
use crate::http::HelpScoutClient;
use crate::output::Emitter;
use crate::state::StateStore;
use std::collections::BTreeMap;

/// Everything one sync run needs, threaded explicitly
///
/// The orchestrator is the single writer of `state`; no other component
/// mutates it.
pub struct SyncContext<E: Emitter> {
    /// Tap configuration
    pub config: TapConfig,
    /// API client
    pub client: HelpScoutClient,
    /// Bookmark store
    pub state: StateStore,
    /// Singer message sink
    pub emitter: E,
}

impl<E: Emitter> SyncContext<E> {
    /// Create a new sync context
    pub fn new(config: TapConfig, client: HelpScoutClient, state: StateStore, emitter: E) -> Self {
        Self {
            config,
            client,
            state,
            emitter,
        }
    }
}

/// Statistics from a sync run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// Total streams synced (children counted separately)
    pub streams_synced: usize,
    /// Total records emitted
    pub records_emitted: usize,
    /// Records emitted per stream
    records_per_stream: BTreeMap<String, usize>,
}

impl SyncSummary {
    /// Create an empty summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Records emitted for one stream
    pub fn records_for(&self, stream: &str) -> usize {
        self.records_per_stream.get(stream).copied().unwrap_or(0)
    }

    /// Record one completed stream pass
    pub(crate) fn record_stream(&mut self, stream: &str, records: usize) {
        self.streams_synced += 1;
        self.records_emitted += records;
        self.records_per_stream.insert(stream.to_string(), records);
    }
}
