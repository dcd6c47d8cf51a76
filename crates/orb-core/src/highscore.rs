//! Ranked highscore table and the persistence seam behind it.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_PLAYER_NAME, MAX_NAME_CHARACTERS};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighscoreEntry {
    pub score: u64,
    pub name: String,
}

/// Fixed number of `(score, name)` rows, best first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighscoreTable {
    entries: Vec<HighscoreEntry>,
    default_name: String,
}

impl HighscoreTable {
    /// A table of `size` zero-score rows under the default name.
    pub fn new(size: usize) -> Self {
        Self {
            entries: vec![
                HighscoreEntry {
                    score: 0,
                    name: DEFAULT_PLAYER_NAME.to_string(),
                };
                size
            ],
            default_name: DEFAULT_PLAYER_NAME.to_string(),
        }
    }

    /// Loads the table from `store`, falling back to an empty table of
    /// `size` rows when the store is missing or unreadable.
    pub fn load_or_default(store: &dyn HighscoreStore, size: usize) -> Self {
        match store.load() {
            Ok(Some(mut table)) => {
                table.entries.resize(
                    size,
                    HighscoreEntry {
                        score: 0,
                        name: table.default_name.clone(),
                    },
                );
                table
            }
            Ok(None) => Self::new(size),
            Err(e) => {
                tracing::warn!("[highscore] failed to load highscores, using defaults: {}", e);
                Self::new(size)
            }
        }
    }

    pub fn entries(&self) -> &[HighscoreEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn best(&self) -> Option<&HighscoreEntry> {
        self.entries.first()
    }

    pub fn default_name(&self) -> &str {
        &self.default_name
    }

    pub fn set_default_name(&mut self, name: &str) {
        self.default_name = truncate_name(name);
    }

    /// Inserts `score` under the default name, pushing lower rows down.
    /// Returns the zero-based rank, or `None` when it did not place.
    pub fn insert(&mut self, score: u64) -> Option<usize> {
        let rank = self.entries.iter().position(|e| score > e.score)?;
        self.entries.insert(
            rank,
            HighscoreEntry {
                score,
                name: self.default_name.clone(),
            },
        );
        self.entries.pop();
        Some(rank)
    }

    /// Renames a row; the name is cut to the maximum length. The name also
    /// becomes the default for future rows.
    pub fn set_name(&mut self, rank: usize, name: &str) -> bool {
        let Some(entry) = self.entries.get_mut(rank) else {
            return false;
        };
        entry.name = truncate_name(name);
        self.default_name = entry.name.clone();
        true
    }

    /// Zeroes every row.
    pub fn reset(&mut self) {
        for entry in &mut self.entries {
            entry.score = 0;
            entry.name.clone_from(&self.default_name);
        }
    }
}

fn truncate_name(name: &str) -> String {
    name.chars().take(MAX_NAME_CHARACTERS).collect()
}

/// Persistence for a [`HighscoreTable`].
pub trait HighscoreStore {
    /// Returns `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<HighscoreTable>>;
    fn save(&self, table: &HighscoreTable) -> Result<()>;
}

/// Store that keeps the table in memory, for tests and sessions without
/// persistent storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    saved: Mutex<Option<HighscoreTable>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HighscoreStore for MemoryStore {
    fn load(&self) -> Result<Option<HighscoreTable>> {
        Ok(self.saved.lock().clone())
    }

    fn save(&self, table: &HighscoreTable) -> Result<()> {
        *self.saved.lock() = Some(table.clone());
        Ok(())
    }
}
