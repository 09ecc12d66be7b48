//! Per-position search statistics.
//!
//! A [`SearchNode`] holds, for every candidate move of one position, the
//! direct statistics (runs and wins of simulations that chose the move here)
//! and the RAVE statistics (simulations in which the same side played the
//! move anywhere later). All counters are atomics so any number of workers
//! can update the same node without locking it; updates to different moves
//! never contend.
//!
//! Ordering: `runs` is always incremented before `wins`, and `wins` is
//! written with `Release` and read with `Acquire`. A reader that loads `wins`
//! and then `runs` therefore never sees more wins than runs.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::game::{Board, Fingerprint, Move, Prior, PriorSource};
use crate::table::NodeId;

/// Marks a move that is not a candidate at this node.
const NO_SLOT: u32 = u32::MAX;

/// Marks a child link that has not been resolved yet.
const NO_CHILD: u32 = 0;

/// Statistics for one candidate move.
#[derive(Debug, Default)]
struct MoveStats {
    runs: AtomicU32,
    wins: AtomicU32,
    rave_runs: AtomicU32,
    rave_wins: AtomicU32,
    prior: Prior,
    /// `NodeId + 1` of the position this move leads to, or `NO_CHILD`.
    child: AtomicU32,
}

/// Statistics for one position.
#[derive(Debug)]
pub struct SearchNode {
    fingerprint: Fingerprint,
    /// Candidate moves in the board's order. Selection iterates this order.
    moves: Box<[Move]>,
    /// Dense move -> slot map over the board's move space.
    slots: Box<[u32]>,
    stats: Box<[MoveStats]>,
    total_runs: AtomicU32,
}

impl SearchNode {
    /// Create a node with the given candidate moves.
    ///
    /// `priors` is either empty or parallel to `moves`. Moves must be below
    /// `move_space`; duplicates keep their first slot.
    pub fn new(fingerprint: Fingerprint, moves: &[Move], move_space: usize, priors: &[Prior]) -> Self {
        debug_assert!(priors.is_empty() || priors.len() == moves.len());

        let mut slots = vec![NO_SLOT; move_space].into_boxed_slice();
        let mut kept = Vec::with_capacity(moves.len());
        let mut stats = Vec::with_capacity(moves.len());

        for (i, &mv) in moves.iter().enumerate() {
            match slots.get_mut(mv) {
                Some(slot) if *slot == NO_SLOT => {
                    *slot = kept.len() as u32;
                    kept.push(mv);
                    stats.push(MoveStats {
                        prior: priors.get(i).copied().unwrap_or_default(),
                        ..MoveStats::default()
                    });
                }
                _ => {}
            }
        }

        Self {
            fingerprint,
            moves: kept.into_boxed_slice(),
            slots,
            stats: stats.into_boxed_slice(),
            total_runs: AtomicU32::new(0),
        }
    }

    /// Create the node for `board`'s current position, seeding priors from
    /// `source`.
    pub fn for_board<B: Board>(board: &B, source: &dyn PriorSource<B>) -> Self {
        let moves = board.legal_moves();
        let mut priors = vec![Prior::default(); moves.len()];
        source.priors(board, &moves, &mut priors);
        Self::new(board.fingerprint(), &moves, board.move_space(), &priors)
    }

    #[inline]
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// Candidate moves, in selection order.
    #[inline]
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    /// Slot index of `mv`, if it is a candidate here.
    #[inline]
    pub fn slot(&self, mv: Move) -> Option<usize> {
        match self.slots.get(mv) {
            Some(&slot) if slot != NO_SLOT => Some(slot as usize),
            _ => None,
        }
    }

    #[inline]
    fn stats(&self, mv: Move) -> Option<&MoveStats> {
        self.slot(mv).map(|slot| &self.stats[slot])
    }

    /// Number of simulations that passed through this node.
    #[inline]
    pub fn total_runs(&self) -> u32 {
        self.total_runs.load(Ordering::Relaxed)
    }

    pub fn runs(&self, mv: Move) -> u32 {
        self.stats(mv).map_or(0, |s| s.runs.load(Ordering::Relaxed))
    }

    pub fn wins(&self, mv: Move) -> u32 {
        self.stats(mv).map_or(0, |s| s.wins.load(Ordering::Acquire))
    }

    pub fn rave_runs(&self, mv: Move) -> u32 {
        self.stats(mv).map_or(0, |s| s.rave_runs.load(Ordering::Relaxed))
    }

    pub fn rave_wins(&self, mv: Move) -> u32 {
        self.stats(mv).map_or(0, |s| s.rave_wins.load(Ordering::Acquire))
    }

    pub fn prior(&self, mv: Move) -> Prior {
        self.stats(mv).map_or(Prior::default(), |s| s.prior)
    }

    /// Record a simulation that passed through this node and chose `mv`.
    ///
    /// A move that is not a candidate still counts towards `total_runs`.
    pub fn record_result(&self, mv: Move, won: bool) {
        self.total_runs.fetch_add(1, Ordering::Relaxed);
        if let Some(s) = self.stats(mv) {
            s.runs.fetch_add(1, Ordering::Relaxed);
            if won {
                s.wins.fetch_add(1, Ordering::Release);
            }
        }
    }

    /// Record a simulation in which the side to move here played `mv` later on.
    pub fn record_rave_result(&self, mv: Move, won: bool) {
        if let Some(s) = self.stats(mv) {
            s.rave_runs.fetch_add(1, Ordering::Relaxed);
            if won {
                s.rave_wins.fetch_add(1, Ordering::Release);
            }
        }
    }

    /// Direct runs plus prior runs, and direct wins plus prior wins.
    #[inline]
    pub(crate) fn experience(&self, mv: Move) -> (f64, f64) {
        match self.stats(mv) {
            Some(s) => {
                let wins = s.wins.load(Ordering::Acquire) + s.prior.wins;
                let runs = s.runs.load(Ordering::Relaxed) + s.prior.runs;
                (runs as f64, wins as f64)
            }
            None => (0.0, 0.0),
        }
    }

    /// RAVE runs and wins.
    #[inline]
    pub(crate) fn rave_experience(&self, mv: Move) -> (f64, f64) {
        match self.stats(mv) {
            Some(s) => {
                let wins = s.rave_wins.load(Ordering::Acquire);
                let runs = s.rave_runs.load(Ordering::Relaxed);
                (runs as f64, wins as f64)
            }
            None => (0.0, 0.0),
        }
    }

    /// Winrate of `mv` including priors, or 0.5 with no experience.
    pub fn win_rate(&self, mv: Move) -> f64 {
        let (runs, wins) = self.experience(mv);
        ratio(wins, runs)
    }

    /// RAVE winrate of `mv`, or 0.5 with no RAVE experience.
    pub fn rave_win_rate(&self, mv: Move) -> f64 {
        let (runs, wins) = self.rave_experience(mv);
        ratio(wins, runs)
    }

    /// The candidate with the most direct runs; the earliest one wins ties.
    /// `None` if no candidate has been run yet.
    pub fn most_visited_move(&self) -> Option<Move> {
        let mut best = None;
        let mut best_runs = 0;
        for (&mv, s) in self.moves.iter().zip(self.stats.iter()) {
            let runs = s.runs.load(Ordering::Relaxed);
            if runs > best_runs {
                best_runs = runs;
                best = Some(mv);
            }
        }
        best
    }

    /// Table index of the position `mv` leads to, if already resolved.
    #[inline]
    pub fn child(&self, mv: Move) -> Option<NodeId> {
        let link = self.stats(mv)?.child.load(Ordering::Acquire);
        (link != NO_CHILD).then(|| NodeId::from_index(link as usize - 1))
    }

    /// Cache the table index of the position `mv` leads to.
    #[inline]
    pub fn set_child(&self, mv: Move, child: NodeId) {
        if let Some(s) = self.stats(mv) {
            s.child.store(child.index() as u32 + 1, Ordering::Release);
        }
    }
}

#[inline]
fn ratio(wins: f64, runs: f64) -> f64 {
    if runs > 0.0 {
        (wins / runs).clamp(0.0, 1.0)
    } else {
        0.5
    }
}
