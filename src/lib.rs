//! Tengen: a parallel Monte Carlo Tree Search engine with a Go front end.
//!
//! Worker threads share a transposition table of search nodes keyed by
//! position fingerprint. Every node keeps per-move statistics in atomic
//! counters, so workers read and update the tree without locking nodes.
//! Moves are selected with UCB1-TUNED, optionally blended with RAVE
//! (all-moves-as-first) statistics.
//!
//! ## Modules
//!
//! - [`game`] - Collaborator traits the search is generic over
//! - [`config`] - Search configuration
//! - [`constants`] - Default parameters
//! - [`table`] - Transposition table
//! - [`node`] - Search nodes and their statistics
//! - [`descender`] - Move selection and tree descent
//! - [`updater`] - Backpropagation of results
//! - [`worker`] - Monte Carlo runs on one thread
//! - [`budget`] - Playout and time budgets
//! - [`player`] - The orchestrator that owns the real board
//! - [`go`] - Go rules, playout policies, scoring and priors
//! - [`gtp`] - Go Text Protocol front end
//!
//! ## Example
//!
//! ```
//! use tengen::budget::Budget;
//! use tengen::config::SearchConfig;
//! use tengen::go::{self, GoBoard};
//!
//! let config = SearchConfig::for_testing().with_threads(2);
//! let mut player = go::new_player(config, GoBoard::new(9)).unwrap();
//!
//! let best = player.search(Budget::Playouts(200)).unwrap();
//! println!("Best move: {}", player.board().str_coord(best));
//! player.commit_move(best).unwrap();
//! ```

pub mod budget;
pub mod config;
pub mod constants;
pub mod descender;
pub mod error;
pub mod game;
pub mod go;
pub mod gtp;
pub mod node;
pub mod player;
pub mod table;
pub mod updater;
pub mod worker;
