use serde::{Deserialize, Serialize};

use super::store::{KeyValueStore, StoreResult};
use crate::LOG_DOMAIN;

pub const HISTORY_KEY: &str = "games";

/// One completed game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub moves: u32,
    /// Completion time, milliseconds since the Unix epoch.
    pub timestamp: i64,
}

fn now_ms() -> i64 {
    glib::real_time() / 1000
}

/// Append-only history of finished games on top of a key-value store.
pub struct ScoreStore<S> {
    store: S,
}

impl<S: KeyValueStore> ScoreStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[cfg(test)]
    pub fn backend(&self) -> &S {
        &self.store
    }

    /// Missing or malformed history is an empty history; a failed read is an error.
    fn load_history(&self) -> StoreResult<Vec<GameRecord>> {
        let Some(raw) = self.store.get(HISTORY_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(history) => Ok(history),
            Err(err) => {
                glib::g_warning!(LOG_DOMAIN, "Ignoring malformed game history: {}", err);
                Ok(Vec::new())
            }
        }
    }

    pub fn history(&self) -> Vec<GameRecord> {
        self.load_history().unwrap_or_else(|err| {
            glib::g_warning!(LOG_DOMAIN, "Could not read game history: {}", err);
            Vec::new()
        })
    }

    pub fn record(&mut self, moves: u32) -> StoreResult<GameRecord> {
        self.record_at(moves, now_ms())
    }

    fn record_at(&mut self, moves: u32, timestamp: i64) -> StoreResult<GameRecord> {
        let entry = GameRecord { moves, timestamp };
        // Never overwrite history that could not be read.
        let mut history = self.load_history()?;
        history.push(entry);
        let encoded = serde_json::to_string(&history)?;
        self.store.set(HISTORY_KEY, &encoded)?;
        glib::g_debug!(
            LOG_DOMAIN,
            "Recorded game #{} with {} moves",
            history.len(),
            moves
        );
        Ok(entry)
    }

    /// Fewest moves; the earliest entry wins a tie.
    pub fn best_record(&self) -> Option<GameRecord> {
        self.history().into_iter().min_by_key(|entry| entry.moves)
    }

    pub fn recent(&self, limit: usize) -> Vec<GameRecord> {
        self.history().into_iter().rev().take(limit).collect()
    }

    pub fn top(&self, limit: usize) -> Vec<GameRecord> {
        let mut entries = self.history();
        // Stable sort keeps older entries ahead of later ties.
        entries.sort_by_key(|entry| entry.moves);
        entries.truncate(limit);
        entries
    }
}
