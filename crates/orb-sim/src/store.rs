//! JSON file persistence for the highscore table.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use orb_core::{HighscoreStore, HighscoreTable, OrbError};

/// Stores the highscore table as pretty-printed JSON at a fixed path.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> OrbError {
        OrbError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl HighscoreStore for JsonFileStore {
    fn load(&self) -> orb_core::Result<Option<HighscoreTable>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        Ok(Some(serde_json::from_str(&text)?))
    }

    fn save(&self, table: &HighscoreTable) -> orb_core::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let json = serde_json::to_string_pretty(table)?;
        fs::write(&self.path, json).map_err(|e| self.io_error(e))
    }
}
