//! The game of Go, wired into the search.
//!
//! - [`board`] - board state, rules, fingerprints and coordinates
//! - [`patterns`] - 3x3 pattern table
//! - [`playout`] - playout policies and area scoring
//! - [`lgrf`] - last-good-reply playouts learned across simulations
//! - [`priors`] - heuristic priors for new search nodes

pub mod board;
pub mod lgrf;
pub mod patterns;
pub mod playout;
pub mod priors;

pub use board::{Cell, GoBoard, IllegalMove, PASS, Point};
pub use lgrf::{LgrfPolicy, LgrfTable};
pub use playout::{ChineseScorer, HeuristicPolicy, PlayoutSpeed, RandomPolicy, measure_playouts};
pub use priors::HeuristicPriors;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::player::Player;

/// The engine used by the GTP and demo front ends.
pub type GoPlayer = Player<GoBoard, LgrfPolicy>;

/// A player on `board` with heuristic priors, and playouts that follow
/// learned replies before the capture and pattern heuristics. All workers
/// share one reply table.
pub fn new_player(config: SearchConfig, board: GoBoard) -> Result<GoPlayer, SearchError> {
    Player::new(config, board, LgrfPolicy::default(), ChineseScorer, HeuristicPriors)
}
