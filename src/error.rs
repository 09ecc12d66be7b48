//! Error types surfaced by the engine.
//!
//! Only structural problems reach callers. Failures inside a single
//! simulation (an illegal move from a playout policy, a cut-off game) are
//! contained by the worker that ran it.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::game::Move;

/// Errors returned by [`Player`](crate::player::Player) operations.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search requires at least one worker thread")]
    NoWorkers,

    #[error("search budget must be positive")]
    EmptyBudget,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("illegal move {mv}: {reason}")]
    IllegalMove { mv: Move, reason: String },
}

/// Errors loading a [`SearchConfig`](crate::config::SearchConfig) file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}
