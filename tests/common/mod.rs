//! A tiny game for exercising the search without Go rules.
//!
//! Players alternately claim one of `n` cells. Cell `i` is worth `2^i`
//! points, so the two sides can never tie. The game ends when every cell is
//! claimed (or after two passes, which only happen on an empty board).

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tengen::game::{Board, Color, Fingerprint, Move, PlayoutPolicy, Prior, PriorSource, Scorer, Winner};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimError {
    #[error("cell {0} is already claimed")]
    Claimed(usize),
    #[error("no cell {0}")]
    NoSuchCell(usize),
    #[error("cannot pass while cells remain")]
    EarlyPass,
}

#[derive(Clone, Debug)]
pub struct ClaimBoard {
    cells: usize,
    owned: [u64; 2],
    to_play: Color,
    turn: usize,
    passes: u32,
}

impl ClaimBoard {
    pub fn new(cells: usize) -> Self {
        assert!(cells < 28);
        Self {
            cells,
            owned: [0, 0],
            to_play: Color::Black,
            turn: 0,
            passes: 0,
        }
    }

    fn claimed(&self) -> u64 {
        self.owned[0] | self.owned[1]
    }

    fn full(&self) -> bool {
        self.claimed().count_ones() as usize == self.cells
    }

    pub fn points(&self, color: Color) -> u64 {
        self.owned[color.index()]
    }
}

impl Board for ClaimBoard {
    type Illegal = ClaimError;

    fn play(&mut self, mv: Move) -> Result<(), ClaimError> {
        if mv == self.cells {
            if !self.full() {
                return Err(ClaimError::EarlyPass);
            }
            self.passes += 1;
        } else {
            if mv > self.cells {
                return Err(ClaimError::NoSuchCell(mv));
            }
            if self.claimed() & (1 << mv) != 0 {
                return Err(ClaimError::Claimed(mv));
            }
            self.owned[self.to_play.index()] |= 1 << mv;
            self.passes = 0;
        }
        self.to_play = self.to_play.opposite();
        self.turn += 1;
        Ok(())
    }

    fn fingerprint(&self) -> Fingerprint {
        let side = match self.to_play {
            Color::Black => 0,
            Color::White => 1,
        };
        self.owned[0] | self.owned[1] << 32 | side << 63 | u64::from(self.passes.min(2)) << 61
    }

    fn legal_moves(&self) -> Vec<Move> {
        let moves: Vec<Move> = (0..self.cells)
            .filter(|&i| self.claimed() & (1 << i) == 0)
            .collect();
        if moves.is_empty() { vec![self.cells] } else { moves }
    }

    fn is_terminal(&self) -> bool {
        self.full() || self.passes >= 2
    }

    fn turn(&self) -> usize {
        self.turn
    }

    fn color_to_play(&self) -> Color {
        self.to_play
    }

    fn passes_in_a_row(&self) -> u32 {
        self.passes
    }

    fn pass(&self) -> Move {
        self.cells
    }

    fn move_space(&self) -> usize {
        self.cells + 1
    }

    fn max_game_length(&self) -> usize {
        2 * self.cells + 2
    }
}

/// Claims a random free cell.
#[derive(Clone, Debug, Default)]
pub struct RandomClaims;

impl PlayoutPolicy<ClaimBoard> for RandomClaims {
    fn select_move(&mut self, board: &ClaimBoard, rng: &mut fastrand::Rng) -> Move {
        let moves = board.legal_moves();
        moves[rng.usize(..moves.len())]
    }
}

/// The side with more points wins.
#[derive(Clone, Debug, Default)]
pub struct ClaimScorer;

impl Scorer<ClaimBoard> for ClaimScorer {
    fn winner(&self, board: &ClaimBoard) -> Winner {
        let black = board.points(Color::Black);
        let white = board.points(Color::White);
        if black > white {
            Winner::Black
        } else if white > black {
            Winner::White
        } else {
            Winner::NoResult
        }
    }
}

/// Never produces a result, as if every game were cut off.
#[derive(Clone, Debug, Default)]
pub struct NoResultScorer;

impl Scorer<ClaimBoard> for NoResultScorer {
    fn winner(&self, _board: &ClaimBoard) -> Winner {
        Winner::NoResult
    }
}

/// Always claims cell 0, which is illegal once it has been taken.
#[derive(Clone, Debug, Default)]
pub struct GreedyFirstCell;

impl PlayoutPolicy<ClaimBoard> for GreedyFirstCell {
    fn select_move(&mut self, _board: &ClaimBoard, _rng: &mut fastrand::Rng) -> Move {
        0
    }
}

/// Counts how many nodes had their priors computed.
#[derive(Clone, Debug, Default)]
pub struct CountingPriors {
    pub calls: Arc<AtomicUsize>,
}

impl PriorSource<ClaimBoard> for CountingPriors {
    fn priors(&self, _board: &ClaimBoard, _moves: &[Move], _out: &mut [Prior]) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }
}
