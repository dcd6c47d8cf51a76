//! Error type shared by the fallible parts of the core (config and highscore I/O).

use std::path::PathBuf;

use crate::orb::OrbId;

/// Errors raised by configuration loading, highscore persistence and
/// operations that name an orb explicitly.
#[derive(Debug, thiserror::Error)]
pub enum OrbError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config value for `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("orb {0} does not exist")]
    UnknownOrb(OrbId),
}

impl OrbError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OrbError>;
