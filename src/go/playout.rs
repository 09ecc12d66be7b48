//! Playout policies and scoring for Go.
//!
//! [`RandomPolicy`] plays uniformly random legal moves that do not fill the
//! mover's own eyes. [`HeuristicPolicy`] first tries to capture or rescue
//! groups in atari next to the last move, then 3x3 pattern replies, then
//! falls back to a random move. [`ChineseScorer`] decides finished games by
//! area scoring. [`measure_playouts`] times bare playouts of a policy.

use std::time::{Duration, Instant};

use super::board::{Cell, GoBoard, IllegalMove, PASS, Point};
use super::patterns::pat3_match;
use crate::constants::{MERCY_DIVISOR, PROB_HEURISTIC_CAPTURE, PROB_HEURISTIC_PAT3, PROB_SSAREJECT};
use crate::game::{Board, Color, Move, PlayoutPolicy, Scorer, Winner};

/// Whether `pt` is a sensible move for the side to move: legal and not
/// filling one of its own true eyes.
#[inline]
pub(super) fn is_candidate(board: &GoBoard, pt: Point) -> bool {
    board.is_legal(pt) && board.is_eye(pt) != Some(board.to_play())
}

/// Pick a random element of `moves` accepted by `accept`, removing rejected
/// ones as it goes.
fn pick(moves: &mut Vec<Point>, rng: &mut fastrand::Rng, mut accept: impl FnMut(Point) -> bool) -> Option<Point> {
    while !moves.is_empty() {
        let i = rng.usize(..moves.len());
        let pt = moves.swap_remove(i);
        if accept(pt) {
            return Some(pt);
        }
    }
    None
}

/// Uniformly random playouts.
#[derive(Clone, Debug, Default)]
pub struct RandomPolicy {
    candidates: Vec<Point>,
}

impl RandomPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// A random candidate move. With probability `reject_self_atari`,
    /// self-atari moves are skipped for this call.
    fn random_move(&mut self, board: &GoBoard, rng: &mut fastrand::Rng, reject_self_atari: f64) -> Move {
        let reject = reject_self_atari > 0.0 && rng.f64() < reject_self_atari;
        self.candidates.clear();
        self.candidates
            .extend(board.points().filter(|&pt| board.cell(pt) == Cell::Empty));

        pick(&mut self.candidates, rng, |pt| {
            is_candidate(board, pt) && !(reject && board.is_self_atari(pt))
        })
        .unwrap_or(PASS)
    }
}

impl PlayoutPolicy<GoBoard> for RandomPolicy {
    fn select_move(&mut self, board: &GoBoard, rng: &mut fastrand::Rng) -> Move {
        self.random_move(board, rng, 0.0)
    }
}

/// Playouts guided by capture and 3x3 pattern heuristics.
#[derive(Clone, Debug, Default)]
pub struct HeuristicPolicy {
    random: RandomPolicy,
    moves: Vec<Point>,
}

impl HeuristicPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves that capture an opponent group in atari, or give an own group
    /// in atari more liberties, around the last move.
    fn capture_moves(&mut self, board: &GoBoard) {
        self.moves.clear();
        let last = board.last_move();
        if last == PASS {
            return;
        }
        let me = board.to_play();
        let mut around = vec![last];
        around.extend(board.all_neighbors(last));

        for pt in around {
            let Some(color) = board.color_at(pt) else {
                continue;
            };
            let Some(lib) = board.atari_liberty(pt) else {
                continue;
            };
            if self.moves.contains(&lib) || !is_candidate(board, lib) {
                continue;
            }
            if color != me || !board.is_self_atari(lib) {
                self.moves.push(lib);
            }
        }
    }

    /// Empty points next to the last two moves that match a 3x3 pattern.
    fn pattern_moves(&mut self, board: &GoBoard) {
        self.moves.clear();
        for last in [board.last_move(), board.last_move2()] {
            if last == PASS {
                continue;
            }
            for pt in board.all_neighbors(last) {
                if board.cell(pt) == Cell::Empty
                    && !self.moves.contains(&pt)
                    && pat3_match(board, pt)
                {
                    self.moves.push(pt);
                }
            }
        }
    }

    fn pick_heuristic(&mut self, board: &GoBoard, rng: &mut fastrand::Rng) -> Option<Point> {
        let reject = rng.f64() < PROB_SSAREJECT;
        pick(&mut self.moves, rng, |pt| {
            is_candidate(board, pt) && !(reject && board.is_self_atari(pt))
        })
    }
}

impl PlayoutPolicy<GoBoard> for HeuristicPolicy {
    fn select_move(&mut self, board: &GoBoard, rng: &mut fastrand::Rng) -> Move {
        if rng.f64() < PROB_HEURISTIC_CAPTURE {
            self.capture_moves(board);
            if let Some(pt) = self.pick_heuristic(board, rng) {
                return pt;
            }
        }
        if rng.f64() < PROB_HEURISTIC_PAT3 {
            self.pattern_moves(board);
            if let Some(pt) = self.pick_heuristic(board, rng) {
                return pt;
            }
        }
        self.random.random_move(board, rng, PROB_SSAREJECT)
    }
}

/// Area scoring with komi. A tie is no result.
#[derive(Copy, Clone, Debug, Default)]
pub struct ChineseScorer;

impl Scorer<GoBoard> for ChineseScorer {
    fn winner(&self, board: &GoBoard) -> Winner {
        let score = board.score();
        if score > 0.0 {
            Winner::Black
        } else if score < 0.0 {
            Winner::White
        } else {
            Winner::NoResult
        }
    }

    /// The side ahead by more than a quarter of the board in stones.
    fn mercy_winner(&self, board: &GoBoard) -> Option<Color> {
        let threshold = board.size() * board.size() / MERCY_DIVISOR;
        let black = board.stones(Color::Black);
        let white = board.stones(Color::White);
        if black > white + threshold {
            Some(Color::Black)
        } else if white > black + threshold {
            Some(Color::White)
        } else {
            None
        }
    }
}

/// Outcome counts and timing of a batch of playouts.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlayoutSpeed {
    pub playouts: u64,
    pub elapsed: Duration,
    pub black_wins: u64,
    pub white_wins: u64,
    /// Ties and games cut off at the move limit.
    pub no_results: u64,
}

impl PlayoutSpeed {
    pub fn per_second(&self) -> f64 {
        self.playouts as f64 / self.elapsed.as_secs_f64().max(1e-9)
    }
}

/// Play `playouts` games from `start` using `policy` alone, each to two
/// passes or the move limit, and score them by area.
pub fn measure_playouts<P: PlayoutPolicy<GoBoard>>(
    start: &GoBoard,
    policy: &mut P,
    playouts: u64,
    rng: &mut fastrand::Rng,
) -> Result<PlayoutSpeed, IllegalMove> {
    let mut board = start.clone();
    let mut speed = PlayoutSpeed {
        playouts,
        ..PlayoutSpeed::default()
    };
    let begin = Instant::now();
    for _ in 0..playouts {
        board.copy_from(start);
        while !board.is_terminal() && board.turn() < board.max_game_length() {
            let mv = policy.select_move(&board, rng);
            board.play(mv)?;
        }
        let winner = if board.is_terminal() {
            ChineseScorer.winner(&board)
        } else {
            Winner::NoResult
        };
        match winner {
            Winner::Black => speed.black_wins += 1,
            Winner::White => speed.white_wins += 1,
            Winner::NoResult => speed.no_results += 1,
        }
    }
    speed.elapsed = begin.elapsed();
    Ok(speed)
}
