//! Output module
//!
//! Singer message types and the emitters that write them.
//!
//! # Overview
//!
//! This module provides:
//! - The `Message` enum (SCHEMA, RECORD, STATE)
//! - The `Emitter` trait for message sinks
//! - `StdoutEmitter` for the real Singer stream
//! - `RecordingEmitter` for asserting on message sequences in tests

mod emitter;
mod message;

pub use emitter::{Emitter, RecordingEmitter, StdoutEmitter};
pub use message::Message;

#[cfg(test)]
mod tests;
