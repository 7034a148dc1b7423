//! State store implementation
//!
//! Loads state at run start and writes it back with atomic file replaces.

use super::types::TapState;
use crate::error::{Error, Result};
use crate::streams;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Owns the state blob for a run and its backing file, when one was given.
///
/// Only the orchestrator mutates state, so the store holds a plain value
/// rather than a lock.
#[derive(Debug, Clone, Default)]
pub struct StateStore {
    /// Path to the state file; empty in memory-only mode
    path: PathBuf,
    /// Current state
    state: TapState,
}

impl StateStore {
    /// Create a store with an empty state backed by the given path
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            state: TapState::new(),
        }
    }

    /// Create a memory-only store (no file persistence)
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load state from a file, starting empty if the file does not exist
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(|e| Error::State {
                message: format!("Failed to read state file: {e}"),
            })?;
            parse_state(&contents)?
        } else {
            TapState::new()
        };

        Ok(Self { path, state })
    }

    /// Parse state from an inline JSON string (memory-only)
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self {
            path: PathBuf::new(),
            state: parse_state(json)?,
        })
    }

    /// Read access to the current state
    pub fn state(&self) -> &TapState {
        &self.state
    }

    /// Write access to the current state
    pub fn state_mut(&mut self) -> &mut TapState {
        &mut self.state
    }

    /// Write the current state back to the backing file.
    ///
    /// A no-op in memory-only mode. Writes go to a temp file first and are
    /// renamed into place so a crash never leaves a half-written file.
    pub async fn save(&self) -> Result<()> {
        if self.is_in_memory() {
            return Ok(());
        }

        let contents = serde_json::to_string_pretty(&self.state).map_err(|e| Error::State {
            message: format!("Failed to serialize state: {e}"),
        })?;

        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::State {
                message: format!("Failed to write state file: {e}"),
            })?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| Error::State {
                message: format!("Failed to rename state file: {e}"),
            })?;

        Ok(())
    }

    /// The backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the store has no backing file
    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str().is_empty()
    }
}

fn parse_state(json: &str) -> Result<TapState> {
    let mut state: TapState = serde_json::from_str(json).map_err(|e| Error::State {
        message: format!("Failed to parse state: {e}"),
    })?;

    // A marker naming a stream the registry does not know cannot be
    // resumed; dropping it makes the run start from the top.
    if let Some(marker) = state.currently_syncing() {
        if streams::stream(marker).is_none() {
            warn!(stream = %marker, "discarding unknown currently_syncing stream from state");
            state.clear_currently_syncing();
        }
    }

    Ok(state)
}
