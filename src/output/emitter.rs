//! Message emitters
//!
//! `Emitter` is the seam between sync logic and the Singer stdout stream.
//! Production uses `StdoutEmitter`; tests capture the sequence with
//! `RecordingEmitter`.

use super::message::Message;
use crate::error::{Error, Result};
use crate::types::JsonValue;
use chrono::{DateTime, Utc};
use std::io::Write;

/// Sink for Singer messages
pub trait Emitter: Send {
    /// Write one message
    fn emit(&mut self, message: Message) -> Result<()>;

    /// Write a schema message
    fn write_schema(
        &mut self,
        stream: &str,
        schema: JsonValue,
        key_properties: &[&str],
        bookmark_properties: Option<&[&str]>,
    ) -> Result<()> {
        self.emit(Message::schema(
            stream,
            schema,
            key_properties,
            bookmark_properties,
        ))
    }

    /// Write a record message
    fn write_record(
        &mut self,
        stream: &str,
        record: JsonValue,
        time_extracted: DateTime<Utc>,
    ) -> Result<()> {
        self.emit(Message::record(stream, record, time_extracted))
    }

    /// Write a state message
    fn write_state(&mut self, value: JsonValue) -> Result<()> {
        self.emit(Message::state(value))
    }
}

/// Emitter that writes one JSON line per message to stdout
///
/// Every message is flushed immediately; downstream targets read the
/// pipe incrementally.
#[derive(Debug, Default)]
pub struct StdoutEmitter;

impl StdoutEmitter {
    /// Create a new stdout emitter
    pub fn new() -> Self {
        Self
    }
}

impl Emitter for StdoutEmitter {
    fn emit(&mut self, message: Message) -> Result<()> {
        let line = message.to_json_line()?;
        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        writeln!(lock, "{line}").map_err(|e| Error::Output {
            message: format!("Failed to write message: {e}"),
        })?;
        lock.flush().map_err(|e| Error::Output {
            message: format!("Failed to flush stdout: {e}"),
        })?;
        Ok(())
    }
}

/// Emitter that buffers messages in memory
///
/// Lets tests assert on the exact message sequence a sync produced.
#[derive(Debug, Default)]
pub struct RecordingEmitter {
    messages: Vec<Message>,
}

impl RecordingEmitter {
    /// Create a new recording emitter
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages in emission order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Record payloads emitted for one stream, in order
    pub fn records_for(&self, stream: &str) -> Vec<&JsonValue> {
        self.messages
            .iter()
            .filter_map(|m| match m {
                Message::Record {
                    stream: s, record, ..
                } if s == stream => Some(record),
                _ => None,
            })
            .collect()
    }

    /// Number of schema messages emitted for one stream
    pub fn schema_count(&self, stream: &str) -> usize {
        self.messages
            .iter()
            .filter(|m| m.is_schema() && m.stream() == Some(stream))
            .count()
    }

    /// State values emitted, in order
    pub fn states(&self) -> Vec<&JsonValue> {
        self.messages
            .iter()
            .filter_map(|m| match m {
                Message::State { value } => Some(value),
                _ => None,
            })
            .collect()
    }

    /// Total number of messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether no messages were emitted
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Emitter for RecordingEmitter {
    fn emit(&mut self, message: Message) -> Result<()> {
        self.messages.push(message);
        Ok(())
    }
}
