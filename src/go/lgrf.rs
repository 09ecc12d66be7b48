//! Last-good-reply playouts with forgetting.
//!
//! Every simulation with a winner teaches the winner's replies: after the
//! previous move `a` (or the two previous moves `b, a`) the winner answered
//! with `r`. A stored reply that the loser used is forgotten. Playouts try
//! the reply to the last two moves, then the reply to the last move, and
//! only then ask the fallback policy.
//!
//! One [`LgrfTable`] is shared by all workers. Entries are plain atomics
//! written without locks; a lost update only loses one reply.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use super::board::{GoBoard, PASS};
use super::playout::{HeuristicPolicy, is_candidate};
use crate::constants::MAX_BOARD_SIZE;
use crate::descender::PlayedMove;
use crate::game::{Board, Color, Move, PlayoutPolicy};

/// Stored as `move + 1`, so a zeroed entry means no reply.
const NO_REPLY: u32 = 0;

pub struct LgrfTable {
    space: usize,
    /// `[color][previous move]`
    replies1: Box<[AtomicU32]>,
    /// `[color][move before previous][previous move]`
    replies2: Box<[AtomicU32]>,
}

impl LgrfTable {
    /// A table for boards whose moves fall below `space`.
    pub fn new(space: usize) -> Self {
        let empty = |n: usize| -> Box<[AtomicU32]> { (0..n).map(|_| AtomicU32::new(NO_REPLY)).collect() };
        Self {
            space,
            replies1: empty(2 * space),
            replies2: empty(2 * space * space),
        }
    }

    /// A table large enough for every supported board size.
    pub fn for_all_sizes() -> Self {
        Self::new(GoBoard::new(MAX_BOARD_SIZE).move_space())
    }

    fn slot1(&self, color: Color, prev: Move) -> Option<&AtomicU32> {
        (prev < self.space).then(|| &self.replies1[color.index() * self.space + prev])
    }

    fn slot2(&self, color: Color, prev2: Move, prev: Move) -> Option<&AtomicU32> {
        (prev < self.space && prev2 < self.space)
            .then(|| &self.replies2[(color.index() * self.space + prev2) * self.space + prev])
    }

    fn load(slot: Option<&AtomicU32>) -> Option<Move> {
        match slot?.load(Ordering::Relaxed) {
            NO_REPLY => None,
            stored => Some(stored as Move - 1),
        }
    }

    /// `color`'s reply to `prev`.
    pub fn reply(&self, color: Color, prev: Move) -> Option<Move> {
        Self::load(self.slot1(color, prev))
    }

    /// `color`'s reply to `prev2` followed by `prev`.
    pub fn reply2(&self, color: Color, prev2: Move, prev: Move) -> Option<Move> {
        Self::load(self.slot2(color, prev2, prev))
    }

    /// Learn the replies of one simulation won by `winner`.
    pub fn update(&self, moves: &[PlayedMove], winner: Color) {
        for i in 1..moves.len() {
            let PlayedMove { color, mv } = moves[i];
            if mv == PASS || mv >= self.space {
                continue;
            }
            let prev = moves[i - 1].mv;
            let slot2 = match i.checked_sub(2) {
                Some(j) => self.slot2(color, moves[j].mv, prev),
                None => None,
            };
            let stored = mv as u32 + 1;
            for slot in [self.slot1(color, prev), slot2].into_iter().flatten() {
                if color == winner {
                    slot.store(stored, Ordering::Relaxed);
                } else {
                    let _ = slot.compare_exchange(stored, NO_REPLY, Ordering::Relaxed, Ordering::Relaxed);
                }
            }
        }
    }

    /// Forget every reply.
    pub fn clear(&self) {
        for slot in self.replies1.iter().chain(self.replies2.iter()) {
            slot.store(NO_REPLY, Ordering::Relaxed);
        }
    }
}

impl fmt::Debug for LgrfTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LgrfTable").field("space", &self.space).finish_non_exhaustive()
    }
}

/// Plays stored replies when they are sensible, otherwise defers to the
/// fallback policy. Clones share the reply table.
#[derive(Clone, Debug)]
pub struct LgrfPolicy<P = HeuristicPolicy> {
    table: Arc<LgrfTable>,
    fallback: P,
}

impl<P> LgrfPolicy<P> {
    pub fn new(table: Arc<LgrfTable>, fallback: P) -> Self {
        Self { table, fallback }
    }

    pub fn table(&self) -> &LgrfTable {
        &self.table
    }

    fn stored_reply(&self, board: &GoBoard) -> Option<Move> {
        if board.turn() == 0 {
            return None;
        }
        let me = board.to_play();
        let last = board.last_move();
        let reply2 = if board.turn() >= 2 {
            self.table.reply2(me, board.last_move2(), last)
        } else {
            None
        };
        [reply2, self.table.reply(me, last)]
            .into_iter()
            .flatten()
            .find(|&reply| reply < board.move_space() && is_candidate(board, reply))
    }
}

impl Default for LgrfPolicy {
    fn default() -> Self {
        Self::new(Arc::new(LgrfTable::for_all_sizes()), HeuristicPolicy::new())
    }
}

impl<P: PlayoutPolicy<GoBoard>> PlayoutPolicy<GoBoard> for LgrfPolicy<P> {
    fn select_move(&mut self, board: &GoBoard, rng: &mut fastrand::Rng) -> Move {
        match self.stored_reply(board) {
            Some(reply) => reply,
            None => self.fallback.select_move(board, rng),
        }
    }

    fn learn(&mut self, moves: &[PlayedMove], winner: Color) {
        self.table.update(moves, winner);
        self.fallback.learn(moves, winner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::go::RandomPolicy;

    fn setup(size: usize, moves: &[&str]) -> GoBoard {
        let mut board = GoBoard::new(size);
        for mv in moves {
            board.play_move(board.parse_coord(mv).unwrap()).unwrap();
        }
        board
    }

    fn played(board: &GoBoard, moves: &[&str]) -> Vec<PlayedMove> {
        let mut color = Color::Black;
        moves
            .iter()
            .map(|mv| {
                let played = PlayedMove { color, mv: board.parse_coord(mv).unwrap() };
                color = color.opposite();
                played
            })
            .collect()
    }

    #[test]
    fn test_winner_replies_are_stored() {
        let board = GoBoard::new(9);
        let at = |c: &str| board.parse_coord(c).unwrap();
        let table = LgrfTable::new(board.move_space());
        table.update(&played(&board, &["D4", "E5", "F6"]), Color::Black);

        assert_eq!(table.reply(Color::Black, at("E5")), Some(at("F6")));
        assert_eq!(table.reply2(Color::Black, at("D4"), at("E5")), Some(at("F6")));
        // White lost, so its reply to D4 is not learned
        assert_eq!(table.reply(Color::White, at("D4")), None);
    }

    #[test]
    fn test_loser_replies_are_forgotten() {
        let board = GoBoard::new(9);
        let at = |c: &str| board.parse_coord(c).unwrap();
        let table = LgrfTable::new(board.move_space());
        let moves = played(&board, &["D4", "E5", "F6"]);
        table.update(&moves, Color::Black);
        table.update(&moves, Color::White);
        assert_eq!(table.reply(Color::Black, at("E5")), None);
        assert_eq!(table.reply2(Color::Black, at("D4"), at("E5")), None);
        assert_eq!(table.reply(Color::White, at("D4")), Some(at("E5")));

        // A different losing reply leaves the stored one alone
        let other = played(&board, &["D4", "E5", "G7"]);
        table.update(&other, Color::Black);
        table.update(&moves, Color::White);
        assert_eq!(table.reply(Color::Black, at("E5")), Some(at("G7")));
    }

    #[test]
    fn test_passes_are_not_learned() {
        let board = GoBoard::new(9);
        let at = |c: &str| board.parse_coord(c).unwrap();
        let table = LgrfTable::new(board.move_space());
        table.update(&played(&board, &["D4", "pass"]), Color::White);
        assert_eq!(table.reply(Color::White, at("D4")), None);

        table.update(&played(&board, &["D4", "C3"]), Color::White);
        assert_eq!(table.reply(Color::White, at("D4")), Some(at("C3")));
        table.clear();
        assert_eq!(table.reply(Color::White, at("D4")), None);
    }

    #[test]
    fn test_policy_plays_stored_reply() {
        let board = setup(9, &["D4", "E5"]);
        let f6 = board.parse_coord("F6").unwrap();
        let table = Arc::new(LgrfTable::new(board.move_space()));
        table.update(&played(&board, &["D4", "E5", "F6"]), Color::Black);

        let mut policy = LgrfPolicy::new(Arc::clone(&table), RandomPolicy::new());
        let mut rng = fastrand::Rng::with_seed(5);
        for _ in 0..10 {
            assert_eq!(policy.select_move(&board, &mut rng), f6);
        }

        // Occupied replies are skipped
        let board = setup(9, &["F6", "D4", "E5"]);
        let mut rng = fastrand::Rng::with_seed(5);
        let mv = LgrfPolicy::new(table, RandomPolicy::new()).select_move(&board, &mut rng);
        assert_ne!(mv, f6);
        assert!(board.is_legal(mv));
    }

    #[test]
    fn test_clones_share_the_table() {
        let board = GoBoard::new(9);
        let at = |c: &str| board.parse_coord(c).unwrap();
        let policy = LgrfPolicy::default();
        let mut clone = policy.clone();
        clone.learn(&played(&board, &["C3", "D4"]), Color::White);
        assert_eq!(policy.table().reply(Color::White, at("C3")), Some(at("D4")));
    }

    #[test]
    fn test_replies_from_larger_boards_are_ignored() {
        let big = GoBoard::new(19);
        let far = big.parse_coord("T19").unwrap();
        let mut small = GoBoard::new(5);
        let last = small.points().next().unwrap();
        small.play_move(last).unwrap();
        assert!(far >= small.move_space());

        let table = Arc::new(LgrfTable::for_all_sizes());
        let moves = [
            PlayedMove { color: Color::Black, mv: last },
            PlayedMove { color: Color::White, mv: far },
        ];
        table.update(&moves, Color::White);
        assert_eq!(table.reply(Color::White, last), Some(far));

        let mut policy = LgrfPolicy::new(table, RandomPolicy::new());
        let mv = policy.select_move(&small, &mut fastrand::Rng::with_seed(1));
        assert!(mv < small.move_space());
        assert!(small.is_legal(mv));
    }
}
