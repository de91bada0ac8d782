pub(crate) mod store;

use serde::{Deserialize, Serialize};
use store::{KeyValueStore, StoreError};
use tracing::{debug, warn};

/// The store key holding the whole leaderboard.
pub(crate) const LEADERBOARD_KEY: &str = "wheel_fortune_leaderboard";

/// A player's cumulative score across sessions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LeaderboardEntry {
    pub(crate) name: String,
    pub(crate) total_score: i64,
}

impl LeaderboardEntry {
    pub(crate) fn new<S: Into<String>>(name: S, total_score: i64) -> Self {
        Self { name: name.into(), total_score }
    }
}

/// Errors that can occur when updating the leaderboard
#[derive(thiserror::Error, Debug)]
pub enum LeaderboardError {
    #[error("failed to serialize leaderboard: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to read leaderboard: {0}")]
    Load(#[source] StoreError),

    #[error("failed to persist leaderboard: {0}")]
    Store(#[from] StoreError),
}

/// Sort entries by descending total score. Ties keep their relative order.
pub(crate) fn sort_descending(entries: &mut [LeaderboardEntry]) {
    entries.sort_by(|a, b| b.total_score.cmp(&a.total_score));
}

/// Add `delta` to `name`'s total, creating the entry if needed, and re-sort.
pub(crate) fn apply_delta(entries: &mut Vec<LeaderboardEntry>, name: &str, delta: i64) {
    match entries.iter_mut().find(|entry| entry.name == name) {
        Some(entry) => entry.total_score = entry.total_score.saturating_add(delta),
        None => entries.push(LeaderboardEntry::new(name, delta)),
    }
    sort_descending(entries);
}

/// The persisted leaderboard.
pub(crate) struct Leaderboard<S> {
    store: S,
}

impl<S: KeyValueStore> Leaderboard<S> {
    pub(crate) fn new(store: S) -> Self {
        Self { store }
    }

    /// All entries, highest total first.
    ///
    /// Missing or unreadable data is logged and reads as an empty leaderboard.
    pub(crate) fn get_all(&self) -> Vec<LeaderboardEntry> {
        self.load().unwrap_or_else(|e| {
            warn!(error = %e, "could not read leaderboard, starting empty");
            Vec::new()
        })
    }

    /// Read the persisted entries. Missing or malformed data is empty, a failing store is an error.
    fn load(&self) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        let raw = match self.store.get(LEADERBOARD_KEY).map_err(LeaderboardError::Load)? {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => return Ok(Vec::new()),
        };
        match serde_json::from_str::<Vec<LeaderboardEntry>>(&raw) {
            Ok(mut entries) => {
                sort_descending(&mut entries);
                Ok(entries)
            }
            Err(e) => {
                warn!(error = %e, "discarding malformed leaderboard data");
                Ok(Vec::new())
            }
        }
    }

    /// Add `delta` to a player's total and persist the result.
    ///
    /// Nothing is written when the current entries can't be read.
    pub(crate) fn upsert_score(&mut self, name: &str, delta: i64) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        let mut entries = self.load()?;
        apply_delta(&mut entries, name, delta);
        self.store.set(LEADERBOARD_KEY, &serde_json::to_string(&entries)?)?;
        debug!(name, delta, entries = entries.len(), "leaderboard saved");
        Ok(entries)
    }

    /// Forget every entry.
    pub(crate) fn reset(&mut self) -> Result<(), LeaderboardError> {
        self.store.remove(LEADERBOARD_KEY)?;
        debug!("leaderboard cleared");
        Ok(())
    }
}
