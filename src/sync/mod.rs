//! Sync orchestrator
//!
//! # Overview
//!
//! Drives one sync run end to end: walks the selected top-level streams in
//! registry order, pages each endpoint, filters and emits records, dispatches
//! child streams from the collected parent ids, and checkpoints bookmarks.
//!
//! # Features
//!
//! - Resumable runs via a `currently_syncing` marker in state
//! - Incremental replication with never-backward bookmarks
//! - Parent/child dispatch after the parent's pagination completes
//! - State flushed (STATE message plus file write) on every mutation

use crate::catalog::{Selection, StreamSelection};
use crate::error::{Error, Result};
use crate::fetch::{FetchQuery, Pager};
use crate::output::Emitter;
use crate::streams::{self, StreamDescriptor};
use crate::types::{JsonObject, JsonValue};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

mod types;

pub use types::{SyncContext, SyncSummary};


/// Run a full sync over the selected streams.
///
/// Streams run in registry order. A `currently_syncing` marker left by an
/// interrupted run skips the streams that already completed; a marker that
/// does not name a selected top-level stream is discarded and the run starts
/// from the top.
pub async fn sync<E: Emitter>(ctx: &mut SyncContext<E>, selection: &Selection) -> Result<SyncSummary> {
    let mut summary = SyncSummary::new();

    let runnable: Vec<&'static StreamDescriptor> = selection
        .selected_streams()
        .iter()
        .filter_map(|id| streams::stream(id))
        .filter(|descriptor| !descriptor.is_child())
        .collect();

    if runnable.is_empty() {
        warn!("no top-level streams selected, nothing to sync");
        return Ok(summary);
    }

    let mut resume_marker = ctx.state.state().currently_syncing().map(String::from);
    if let Some(marker) = resume_marker.clone() {
        if !runnable.iter().any(|descriptor| descriptor.id == marker) {
            warn!(
                stream = %marker,
                "resume marker does not name a selected stream, starting from the top"
            );
            ctx.state.state_mut().clear_currently_syncing();
            flush_state(ctx).await?;
            resume_marker = None;
        }
    }

    for descriptor in runnable {
        if let Some(marker) = &resume_marker {
            if descriptor.id != marker {
                info!(stream = %descriptor.id, "already synced before the interruption, skipping");
                continue;
            }
            resume_marker = None;
        }
        sync_stream(ctx, selection, descriptor, &mut summary).await?;
    }

    info!(
        streams = summary.streams_synced,
        records = summary.records_emitted,
        "sync complete"
    );
    Ok(summary)
}

/// Sync one top-level stream and its selected children.
async fn sync_stream<E: Emitter>(
    ctx: &mut SyncContext<E>,
    selection: &Selection,
    descriptor: &'static StreamDescriptor,
    summary: &mut SyncSummary,
) -> Result<()> {
    info!(stream = %descriptor.id, "starting sync");

    ctx.state.state_mut().set_currently_syncing(descriptor.id);
    flush_state(ctx).await?;

    let plan = selection_for(selection, descriptor.id)?;
    let children = selected_children(selection, descriptor)?;

    // Schemas go out before any record, children included.
    announce_schema(&mut ctx.emitter, descriptor, plan)?;
    for (child, child_plan) in &children {
        announce_schema(&mut ctx.emitter, child, child_plan)?;
    }

    let start = effective_start(ctx, descriptor)?;
    let mut pass = StreamPass::new(descriptor, plan, start);
    let query = FetchQuery::new(descriptor.endpoint_path).with_cursor(start);
    run_pass(ctx, &mut pass, query, None).await?;

    let parent_records = pass.records_emitted;
    let parent_max = pass.max_cursor.take();
    let parent_ids = std::mem::take(&mut pass.parent_ids);
    summary.record_stream(descriptor.id, parent_records);

    for (child, child_plan) in children {
        let child_start = effective_start(ctx, child)?;
        let mut child_pass = StreamPass::new(child, child_plan, child_start);
        for parent_id in &parent_ids {
            let query = FetchQuery::new(child.resolve_path(parent_id)).with_cursor(child_start);
            run_pass(ctx, &mut child_pass, query, Some(parent_id)).await?;
        }
        summary.record_stream(child.id, child_pass.records_emitted);
        info!(
            stream = %child.id,
            parents = parent_ids.len(),
            records = child_pass.records_emitted,
            "finished child sync"
        );
        if let Some(max) = child_pass.max_cursor {
            ctx.state.state_mut().advance_bookmark(child.id, &max);
            flush_state(ctx).await?;
        }
    }

    // The parent bookmark moves only once its children are done, so an
    // interrupted run re-fetches the parent window and re-runs them.
    if let Some(max) = parent_max {
        ctx.state.state_mut().advance_bookmark(descriptor.id, &max);
    }
    ctx.state.state_mut().clear_currently_syncing();
    flush_state(ctx).await?;

    info!(stream = %descriptor.id, records = parent_records, "finished sync");
    Ok(())
}

/// Per-stream accounting carried across pages and, for children, across
/// parent ids.
struct StreamPass<'a> {
    descriptor: &'static StreamDescriptor,
    plan: &'a StreamSelection,
    effective_start: DateTime<Utc>,
    max_cursor: Option<String>,
    parent_ids: Vec<JsonValue>,
    records_emitted: usize,
}

impl<'a> StreamPass<'a> {
    fn new(
        descriptor: &'static StreamDescriptor,
        plan: &'a StreamSelection,
        effective_start: DateTime<Utc>,
    ) -> Self {
        Self {
            descriptor,
            plan,
            effective_start,
            max_cursor: None,
            parent_ids: Vec::new(),
            records_emitted: 0,
        }
    }

    fn process_record<E: Emitter>(
        &mut self,
        emitter: &mut E,
        mut record: JsonObject,
        time_extracted: DateTime<Utc>,
        parent_id: Option<&JsonValue>,
    ) -> Result<()> {
        if let (Some(link), Some(id)) = (self.descriptor.parent, parent_id) {
            record.insert(link.foreign_key.to_string(), id.clone());
        }

        // Parent ids are collected from every record, filtered or not:
        // children replicate on their own cursors.
        if self.descriptor.has_children() {
            let id_field = self.descriptor.primary_keys[0];
            let id = record.get(id_field).cloned().ok_or_else(|| {
                Error::record_shape(
                    self.descriptor.id,
                    format!("record is missing its '{id_field}' primary key"),
                )
            })?;
            self.parent_ids.push(id);
        }

        if !self.passes_filter(&record)? {
            return Ok(());
        }

        let filtered = self.plan.filter_record(record);
        emitter.write_record(self.descriptor.id, JsonValue::Object(filtered), time_extracted)?;
        self.records_emitted += 1;
        Ok(())
    }

    /// Apply the replication-key filter and track the max cursor seen.
    ///
    /// Records carrying no replication key pass through unfiltered. The
    /// filter compares parsed instants because record cursors may carry
    /// fractional seconds while bookmarks do not; the max is tracked on the
    /// raw strings, which share one format record to record.
    fn passes_filter(&mut self, record: &JsonObject) -> Result<bool> {
        let Some(key) = self.descriptor.replication_key() else {
            return Ok(true);
        };
        let Some(value) = record.get(key) else {
            return Ok(true);
        };
        let JsonValue::String(value) = value else {
            return Err(Error::record_shape(
                self.descriptor.id,
                format!("replication key '{key}' is not a string"),
            ));
        };
        let instant = parse_instant(value).ok_or_else(|| {
            Error::record_shape(
                self.descriptor.id,
                format!("unparseable '{key}' cursor '{value}'"),
            )
        })?;

        if self.max_cursor.as_deref().map_or(true, |max| value.as_str() > max) {
            self.max_cursor = Some(value.clone());
        }

        Ok(instant >= self.effective_start)
    }
}

/// Page through one endpoint invocation, feeding every record to the pass.
async fn run_pass<E: Emitter>(
    ctx: &mut SyncContext<E>,
    pass: &mut StreamPass<'_>,
    query: FetchQuery,
    parent_id: Option<&JsonValue>,
) -> Result<()> {
    let mut pager = Pager::new(pass.descriptor, query, &ctx.client);
    while let Some(page) = pager.next_page().await? {
        let time_extracted = Utc::now();
        debug!(
            stream = %pass.descriptor.id,
            records = page.len(),
            "processing page"
        );
        for record in page {
            pass.process_record(&mut ctx.emitter, record, time_extracted, parent_id)?;
        }
    }
    Ok(())
}

/// Emit the SCHEMA message for one stream.
fn announce_schema<E: Emitter>(
    emitter: &mut E,
    descriptor: &StreamDescriptor,
    plan: &StreamSelection,
) -> Result<()> {
    let bookmark_keys: Option<Vec<&str>> = descriptor.replication_key().map(|key| vec![key]);
    emitter.write_schema(
        descriptor.id,
        plan.schema.clone(),
        descriptor.primary_keys,
        bookmark_keys.as_deref(),
    )
}

/// The cursor a stream replicates from: its bookmark, else the configured
/// start date.
fn effective_start<E: Emitter>(
    ctx: &SyncContext<E>,
    descriptor: &StreamDescriptor,
) -> Result<DateTime<Utc>> {
    let cursor = ctx
        .state
        .state()
        .get_bookmark(descriptor.id)
        .unwrap_or(ctx.config.start_date.as_str());
    parse_instant(cursor).ok_or_else(|| {
        Error::state(format!(
            "invalid cursor '{cursor}' for stream '{}'",
            descriptor.id
        ))
    })
}

/// Selection plan for a stream that resolution guaranteed is present.
fn selection_for<'a>(selection: &'a Selection, stream_id: &str) -> Result<&'a StreamSelection> {
    selection
        .stream(stream_id)
        .ok_or_else(|| Error::catalog(format!("no selection plan for stream '{stream_id}'")))
}

/// Children of a stream that are themselves selected, with their plans.
fn selected_children<'a>(
    selection: &'a Selection,
    descriptor: &StreamDescriptor,
) -> Result<Vec<(&'static StreamDescriptor, &'a StreamSelection)>> {
    let mut children = Vec::new();
    for child_id in descriptor.child_stream_ids {
        if !selection.is_selected(child_id) {
            debug!(stream = %child_id, "child stream not selected, skipping");
            continue;
        }
        let child = streams::stream(child_id)
            .ok_or_else(|| Error::catalog(format!("unknown child stream '{child_id}'")))?;
        children.push((child, selection_for(selection, child_id)?));
    }
    Ok(children)
}

/// Emit a STATE message and persist the state file.
async fn flush_state<E: Emitter>(ctx: &mut SyncContext<E>) -> Result<()> {
    let value = ctx.state.state().to_value()?;
    ctx.emitter.write_state(value)?;
    ctx.state.save().await
}

/// Parse an ISO-8601 UTC instant, fractional seconds or not.
fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|instant| instant.with_timezone(&Utc))
}
