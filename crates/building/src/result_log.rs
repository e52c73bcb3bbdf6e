//! Ring-buffer log of recent placement attempts and their results.
//!
//! The [`PlacementLog`] resource keeps the last 64 attempts so UI and tests
//! can inspect what happened without listening to every event.

use bevy::prelude::*;

use crate::results::PlacementResult;

/// Maximum number of entries retained in the ring buffer.
const MAX_ENTRIES: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub struct PlacementLogEntry {
    pub descriptor: String,
    pub layer: usize,
    pub result: PlacementResult,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct PlacementLog {
    entries: Vec<PlacementLogEntry>,
}

impl PlacementLog {
    /// Record an attempt. If the buffer is full the oldest entry is evicted.
    pub fn push(&mut self, descriptor: impl Into<String>, layer: usize, result: PlacementResult) {
        if self.entries.len() >= MAX_ENTRIES {
            self.entries.remove(0);
        }
        self.entries.push(PlacementLogEntry {
            descriptor: descriptor.into(),
            layer,
            result,
        });
    }

    /// Return the last `n` entries (or fewer if the log is shorter).
    pub fn last_n(&self, n: usize) -> &[PlacementLogEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    pub fn failures(&self) -> impl Iterator<Item = &PlacementLogEntry> {
        self.entries.iter().filter(|e| e.result.is_err())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
