use chrono::Local;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::KeyValueStore;

pub const STORAGE_KEY: &str = "blockfall.high_scores";
pub const MAX_ENTRIES: usize = 3;
pub const ANONYMOUS: &str = "Anonymous";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    pub score: u32,
    pub date: String,
}

impl Entry {
    /// Builds an entry dated today. Blank names become [`ANONYMOUS`].
    pub fn new(name: &str, score: u32) -> Self {
        Entry::dated(name, score, Local::now().format("%Y-%m-%d").to_string())
    }

    pub fn dated(name: &str, score: u32, date: String) -> Self {
        let name = match name.trim() {
            "" => ANONYMOUS.to_owned(),
            trimmed => trimmed.to_owned(),
        };
        Entry { name, score, date }
    }
}

/// Top scores, best first, backed by a key-value store.
pub struct Leaderboard<S> {
    store: S,
    entries: Vec<Entry>,
}

impl<S: KeyValueStore> Leaderboard<S> {
    /// Loads the table. Missing or unreadable data yields an empty board.
    pub fn load(store: S) -> Self {
        let entries = match store.get(STORAGE_KEY) {
            Some(blob) => match serde_json::from_str::<Vec<Entry>>(&blob) {
                Ok(mut entries) => {
                    entries.sort_by(|a, b| b.score.cmp(&a.score));
                    entries.truncate(MAX_ENTRIES);
                    entries
                }
                Err(e) => {
                    warn!("discarding corrupt high scores: {e}");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        Leaderboard { store, entries }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    pub fn qualifies(&self, score: u32) -> bool {
        match self.entries.get(MAX_ENTRIES - 1) {
            None => true,
            Some(lowest) => score > lowest.score,
        }
    }

    /// Inserts an entry, keeps the best [`MAX_ENTRIES`] and persists them.
    /// Returns the entry's rank if it made the table.
    pub fn submit(&mut self, entry: Entry) -> Result<Option<usize>> {
        let candidate = entry.clone();
        self.entries.push(entry);
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_ENTRIES);

        let blob = serde_json::to_string(&self.entries)?;
        self.store.set(STORAGE_KEY, &blob)?;

        let rank = self.entries.iter().position(|e| *e == candidate);
        if let Some(rank) = rank {
            info!("{} placed #{} with {}", candidate.name, rank + 1, candidate.score);
        }
        Ok(rank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn entry(name: &str, score: u32) -> Entry {
        Entry::dated(name, score, "2024-01-01".to_owned())
    }

    #[test]
    fn short_table_always_qualifies() {
        let mut board = Leaderboard::load(MemoryStore::default());
        assert!(board.qualifies(0));
        board.submit(entry("a", 50)).unwrap();
        assert!(board.qualifies(0));
        board.submit(entry("b", 40)).unwrap();
        assert!(board.qualifies(0));
        board.submit(entry("c", 30)).unwrap();
        assert!(!board.qualifies(30));
        assert!(board.qualifies(31));
    }

    #[test]
    fn submit_sorts_truncates_and_persists() {
        let mut board = Leaderboard::load(MemoryStore::default());
        for (name, score) in [("a", 10), ("b", 30), ("c", 20)] {
            board.submit(entry(name, score)).unwrap();
        }
        assert_eq!(board.submit(entry("d", 25)).unwrap(), Some(1));
        assert_eq!(board.submit(entry("e", 5)).unwrap(), None);

        let scores: Vec<u32> = board.entries().iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![30, 25, 20]);

        let reloaded = Leaderboard::load(board.store().clone());
        assert_eq!(reloaded.entries(), board.entries());
    }

    #[test]
    fn corrupt_or_missing_data_loads_empty() {
        let mut store = MemoryStore::default();
        assert!(Leaderboard::load(store.clone()).entries().is_empty());
        store.set(STORAGE_KEY, "{not json").unwrap();
        assert!(Leaderboard::load(store.clone()).entries().is_empty());
        store.set(STORAGE_KEY, r#"{"name":"x"}"#).unwrap();
        assert!(Leaderboard::load(store).entries().is_empty());
    }

    #[test]
    fn blank_names_become_anonymous() {
        assert_eq!(entry("   ", 1).name, ANONYMOUS);
        assert_eq!(entry(" ada ", 1).name, "ada");
        assert_eq!(Entry::new("", 0).date.len(), 10);
    }
}
