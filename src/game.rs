//! Collaborator interfaces between the search core and a concrete game.
//!
//! The search never looks at game rules directly. It talks to:
//! - a [`Board`] for legality, move execution and position fingerprints,
//! - a [`PlayoutPolicy`] that picks moves once a simulation leaves the tree,
//! - a [`Scorer`] that decides who won a finished simulation,
//! - a [`PriorSource`] that biases freshly created search nodes.
//!
//! The [`go`](crate::go) module provides one implementation of each.

use std::error::Error;
use std::fmt;

use crate::descender::PlayedMove;

/// A move, as an index into the board's dense move space
/// (`0..Board::move_space()`). The pass move is one of these indices.
pub type Move = usize;

/// A hash summarizing a position.
///
/// Two distinct positions may share a fingerprint. The search then silently
/// shares their statistics; with 64-bit Zobrist keys the probability is small
/// enough to be accepted rather than checked.
pub type Fingerprint = u64;

/// A side in the game.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    #[inline]
    pub fn opposite(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// 0 for Black, 1 for White.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Color::Black => 0,
            Color::White => 1,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => write!(f, "black"),
            Color::White => write!(f, "white"),
        }
    }
}

/// Outcome of a simulation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Winner {
    Black,
    White,
    /// The simulation was cut off or ended in a tie; no statistics are
    /// recorded for it.
    NoResult,
}

impl Winner {
    /// The winning side, if any.
    #[inline]
    pub fn color(self) -> Option<Color> {
        match self {
            Winner::Black => Some(Color::Black),
            Winner::White => Some(Color::White),
            Winner::NoResult => None,
        }
    }
}

impl From<Color> for Winner {
    fn from(color: Color) -> Self {
        match color {
            Color::Black => Winner::Black,
            Color::White => Winner::White,
        }
    }
}

/// Virtual experience given to a move when its node is created.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Prior {
    pub runs: u32,
    pub wins: u32,
}

impl Prior {
    pub fn new(runs: u32, wins: u32) -> Self {
        debug_assert!(wins <= runs, "prior wins exceed prior runs");
        Self { runs, wins }
    }
}

/// The rules engine the search plays moves on.
///
/// Every worker owns a private clone; boards are never shared mutably.
pub trait Board: Clone + Send + Sync {
    /// Reason a move was rejected.
    type Illegal: Error + Send + Sync + 'static;

    /// Overwrite `self` with the state of `other`, reusing allocations when
    /// possible.
    fn copy_from(&mut self, other: &Self) {
        self.clone_from(other);
    }

    fn play(&mut self, mv: Move) -> Result<(), Self::Illegal>;

    fn fingerprint(&self) -> Fingerprint;

    /// Candidate moves in a fixed, deterministic order. Never empty for a
    /// position that is not terminal.
    fn legal_moves(&self) -> Vec<Move>;

    fn is_terminal(&self) -> bool;

    /// Number of moves played so far.
    fn turn(&self) -> usize;

    fn color_to_play(&self) -> Color;

    fn passes_in_a_row(&self) -> u32;

    fn pass(&self) -> Move;

    /// Upper bound (exclusive) on move indices.
    fn move_space(&self) -> usize;

    /// Simulations reaching this turn are abandoned without a result.
    fn max_game_length(&self) -> usize;
}

/// Chooses moves once a simulation has left the tree.
///
/// Each worker owns its own clone, so implementations may keep scratch
/// buffers.
pub trait PlayoutPolicy<B: Board>: Clone + Send {
    fn select_move(&mut self, board: &B, rng: &mut fastrand::Rng) -> Move;

    /// Feedback after a simulation with a winner. `moves` holds every move
    /// of the simulation, starting from the root position.
    fn learn(&mut self, _moves: &[PlayedMove], _winner: Color) {}
}

/// Decides the outcome of simulations.
pub trait Scorer<B: Board>: Send + Sync {
    /// Winner of a finished game.
    fn winner(&self, board: &B) -> Winner;

    /// A side whose lead is large enough to end the playout early.
    fn mercy_winner(&self, _board: &B) -> Option<Color> {
        None
    }
}

/// Supplies initial statistics when a search node is created.
pub trait PriorSource<B: Board>: Send + Sync {
    /// Fill `out[i]` with the prior for `moves[i]`. `out` arrives zeroed.
    fn priors(&self, board: &B, moves: &[Move], out: &mut [Prior]);
}

/// Leaves every prior at zero.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoPriors;

impl<B: Board> PriorSource<B> for NoPriors {
    fn priors(&self, _board: &B, _moves: &[Move], _out: &mut [Prior]) {}
}
