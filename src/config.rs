//! Search configuration.
//!
//! A [`SearchConfig`] is built once (defaults, optionally a TOML file, then
//! command-line overrides), validated, and handed to the
//! [`Player`](crate::player::Player). It is never mutated afterwards.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::constants::{
    DEFAULT_THREADS, EXPLORATION, FIRST_PLAY_URGENCY, RAVE_EQUIV, TABLE_CAPACITY, TABLE_SHARDS,
    VARIANCE_CAP,
};
use crate::error::{ConfigError, SearchError};

/// How the descender scores moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// UCB1-TUNED on direct statistics only. RAVE statistics are not kept.
    Ucb1Tuned,
    /// UCB1-TUNED blended with RAVE statistics.
    Rave,
}

/// Configuration for the parallel search.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Number of worker threads.
    pub threads: usize,

    /// Maximum number of nodes in the transposition table.
    pub table_capacity: usize,

    /// Number of independently locked shards in the transposition table.
    pub table_shards: usize,

    /// Exploration constant `C` in the UCB term.
    pub exploration: f64,

    /// Cap on the UCB1-TUNED variance estimate.
    pub variance_cap: f64,

    /// RAVE equivalence parameter. Larger values keep RAVE influential for
    /// more visits.
    pub rave_equiv: f64,

    /// Score of a move with no runs (prior runs included) and no RAVE
    /// experience.
    ///
    /// Under [`SelectionPolicy::Rave`] a move with no runs but some RAVE
    /// experience scores its bare RAVE win rate, with no exploration bonus.
    /// Such a move can lose to its siblings for as long as its RAVE rate
    /// stays low, so it may never be tried at that node. Priors avoid this:
    /// a move with prior runs is scored like a visited one.
    pub first_play_urgency: f64,

    pub selection: SelectionPolicy,

    /// Base seed for the workers' random number generators. `None` picks a
    /// random base.
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            threads: DEFAULT_THREADS,
            table_capacity: TABLE_CAPACITY,
            table_shards: TABLE_SHARDS,
            exploration: EXPLORATION,
            variance_cap: VARIANCE_CAP,
            rave_equiv: RAVE_EQUIV,
            first_play_urgency: FIRST_PLAY_URGENCY,
            selection: SelectionPolicy::Rave,
            seed: None,
        }
    }
}

impl SearchConfig {
    /// Create a small single-threaded, seeded config for testing.
    pub fn for_testing() -> Self {
        Self {
            threads: 1,
            table_capacity: 4096,
            table_shards: 4,
            seed: Some(1),
            ..Self::default()
        }
    }

    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load a TOML file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Builder pattern: set number of threads.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Builder pattern: set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder pattern: set the selection policy.
    pub fn with_selection(mut self, selection: SelectionPolicy) -> Self {
        self.selection = selection;
        self
    }

    /// Builder pattern: set the table capacity.
    pub fn with_table_capacity(mut self, capacity: usize) -> Self {
        self.table_capacity = capacity;
        self
    }

    /// Whether RAVE statistics are maintained and used.
    #[inline]
    pub fn uses_rave(&self) -> bool {
        self.selection == SelectionPolicy::Rave
    }

    /// Check the values the search relies on.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.threads == 0 {
            return Err(SearchError::NoWorkers);
        }
        if self.table_capacity == 0 || self.table_capacity > u32::MAX as usize - 1 {
            return Err(SearchError::InvalidConfig(format!(
                "table_capacity must be in 1..{}, got {}",
                u32::MAX,
                self.table_capacity
            )));
        }
        if self.table_shards == 0 {
            return Err(SearchError::InvalidConfig(
                "table_shards must be positive".to_string(),
            ));
        }
        if !(self.exploration >= 0.0 && self.exploration.is_finite()) {
            return Err(SearchError::InvalidConfig(format!(
                "exploration must be a non-negative number, got {}",
                self.exploration
            )));
        }
        if !(self.variance_cap > 0.0 && self.variance_cap.is_finite()) {
            return Err(SearchError::InvalidConfig(format!(
                "variance_cap must be positive, got {}",
                self.variance_cap
            )));
        }
        if !(self.rave_equiv > 0.0 && self.rave_equiv.is_finite()) {
            return Err(SearchError::InvalidConfig(format!(
                "rave_equiv must be positive, got {}",
                self.rave_equiv
            )));
        }
        if !self.first_play_urgency.is_finite() {
            return Err(SearchError::InvalidConfig(
                "first_play_urgency must be finite".to_string(),
            ));
        }
        Ok(())
    }
}
