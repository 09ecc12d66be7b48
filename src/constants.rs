//! Default tuning constants for the search and the Go heuristics.
//!
//! Search constants feed [`SearchConfig::default`](crate::config::SearchConfig),
//! which is the only place the engine reads them from; nothing here is
//! consulted at runtime behind the configuration's back.

// =============================================================================
// Search Parameters
// =============================================================================

/// Default number of worker threads.
pub const DEFAULT_THREADS: usize = 2;

/// Default number of playouts per move for the GTP and demo front ends.
pub const N_SIMS: u64 = 1400;

/// Default transposition table capacity, in nodes.
pub const TABLE_CAPACITY: usize = 1 << 16;

/// Default number of lock shards in the transposition table.
pub const TABLE_SHARDS: usize = 64;

/// UCB exploration constant.
pub const EXPLORATION: f64 = 1.0;

/// Upper bound on the UCB1-TUNED variance estimate (the variance of a
/// Bernoulli variable never exceeds 1/4).
pub const VARIANCE_CAP: f64 = 0.25;

/// RAVE equivalence parameter - controls RAVE vs UCB balance.
pub const RAVE_EQUIV: f64 = 3500.0;

/// Score of a move with no direct or RAVE experience.
pub const FIRST_PLAY_URGENCY: f64 = 1.1;

/// Winrate threshold below which the engine resigns.
pub const RESIGN_THRES: f64 = 0.2;

// =============================================================================
// Go Defaults
// =============================================================================

/// Default board size.
pub const DEFAULT_BOARD_SIZE: usize = 9;

/// Largest supported board size.
pub const MAX_BOARD_SIZE: usize = 19;

/// Default komi (compensation points for White).
pub const DEFAULT_KOMI: f32 = 7.5;

/// Games are cut off after this many moves per board point.
pub const MAX_GAME_LEN_FACTOR: usize = 3;

/// A playout ends early once one side leads by more than
/// `area / MERCY_DIVISOR` stones.
pub const MERCY_DIVISOR: usize = 4;

// =============================================================================
// Prior Values (for search node initialization)
// =============================================================================

/// Base prior for all moves (ensures exploration).
pub const PRIOR_EVEN: u32 = 10;

/// Negative prior for self-atari moves.
pub const PRIOR_SELFATARI: u32 = 10;

/// Prior bonus for capturing a single stone.
pub const PRIOR_CAPTURE_ONE: u32 = 15;

/// Prior bonus for capturing multiple stones.
pub const PRIOR_CAPTURE_MANY: u32 = 30;

/// Prior bonus for moves matching 3x3 patterns.
pub const PRIOR_PAT3: u32 = 10;

/// Prior bonus by distance from last move (CFG distance 1, 2, 3).
pub const PRIOR_CFG: [u32; 3] = [24, 22, 8];

/// Negative prior for moves in empty areas.
pub const PRIOR_EMPTYAREA: u32 = 10;

// =============================================================================
// Playout Heuristic Probabilities
// =============================================================================

/// Probability of using capture heuristic in playouts.
pub const PROB_HEURISTIC_CAPTURE: f64 = 0.9;

/// Probability of using 3x3 pattern heuristic in playouts.
pub const PROB_HEURISTIC_PAT3: f64 = 0.95;

/// Probability of rejecting self-atari in playouts.
pub const PROB_SSAREJECT: f64 = 0.9;
