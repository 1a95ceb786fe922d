//! Registry snapshot cache keyed by operation history.
//!
//! The cache holds at most the most recent snapshot for the conversation.
//! It is a pure performance shortcut: a stale or mismatched entry is
//! treated as a miss and the session replays the full history instead, so
//! cache state can never change what a turn computes.

use crate::Turn;
use chatcad_engine::ModelRegistry;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tracing::debug;

/// Hash of an operation history, truncated to the last `depth` turns.
///
/// The total turn count is hashed in as well, so two histories that share
/// a recent suffix but differ in length never collide.
pub fn history_key(history: &[Turn], depth: usize) -> u64 {
    let mut hasher = DefaultHasher::new();
    history.len().hash(&mut hasher);
    let start = history.len().saturating_sub(depth);
    for turn in &history[start..] {
        // Hash the serialized log; operation types carry no Hash impl and
        // the JSON form is already the canonical wire representation.
        match turn.log.to_json() {
            Ok(json) => json.hash(&mut hasher),
            Err(_) => 0u8.hash(&mut hasher),
        }
    }
    hasher.finish()
}

#[derive(Debug, Clone)]
struct CacheEntry {
    key: u64,
    registry: ModelRegistry,
}

/// Single-slot snapshot cache for one conversation.
#[derive(Debug, Clone, Default)]
pub struct SessionCache {
    entry: Option<CacheEntry>,
}

impl SessionCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the snapshot for `key`. A key mismatch means the stored
    /// snapshot no longer corresponds to the requested history; that is
    /// reported as a miss, never as an error.
    pub fn lookup(&self, key: u64) -> Option<&ModelRegistry> {
        match &self.entry {
            Some(entry) if entry.key == key => {
                debug!(key, "session cache hit");
                Some(&entry.registry)
            }
            Some(entry) => {
                debug!(
                    requested = key,
                    stored = entry.key,
                    "session cache key mismatch, treating as miss"
                );
                None
            }
            None => {
                debug!(key, "session cache empty");
                None
            }
        }
    }

    /// Store `registry` as the snapshot for `key`, dropping any prior
    /// snapshot.
    pub fn store(&mut self, key: u64, registry: ModelRegistry) {
        self.entry = Some(CacheEntry { key, registry });
    }

    /// Drop the stored snapshot.
    pub fn clear(&mut self) {
        self.entry = None;
    }
}
