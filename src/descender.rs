//! Tree descent (selection policy).
//!
//! Starting from the root node, the descender repeatedly picks the move with
//! the highest score, plays it on the worker's private board, and follows the
//! resulting position into the table. It stops at the frontier (a position
//! with no node yet), at the end of the game, or at the move limit.
//!
//! Scores combine the node's direct statistics with a UCB1-TUNED exploration
//! bonus and, under [`SelectionPolicy::Rave`], with RAVE statistics weighted
//! by [`rave_weight`].

use crate::config::{SearchConfig, SelectionPolicy};
use crate::game::{Board, Color, Move};
use crate::node::SearchNode;
use crate::table::{NodeId, TranspositionTable};

/// One in-tree decision of a simulation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PathStep {
    pub node: NodeId,
    pub mv: Move,
    /// Side that chose `mv` at `node`.
    pub color: Color,
    /// Index of this move in the simulation's move list.
    pub ply: usize,
}

/// A move played during a simulation, in or beyond the tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PlayedMove {
    pub color: Color,
    pub mv: Move,
}

/// How a descent ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Descent {
    /// The position after the last path step has no node. The parent is the
    /// last node on the path.
    Frontier { parent: NodeId, mv: Move },
    /// The game ended inside the tree.
    Terminal,
    /// The move limit was reached; the simulation has no result.
    Aborted,
}

/// Weight of the RAVE estimate given `rave_runs` RAVE samples and `runs`
/// direct samples. Decreases monotonically in `runs`; zero without RAVE
/// samples.
#[inline]
pub fn rave_weight(rave_runs: f64, runs: f64, rave_equiv: f64) -> f64 {
    if rave_runs <= 0.0 {
        return 0.0;
    }
    rave_runs / (rave_runs + runs + rave_runs * runs / rave_equiv)
}

/// Position of the search within the tree.
enum State {
    InTree(NodeId),
    Playout(Descent),
}

pub struct Descender<'a> {
    config: &'a SearchConfig,
}

impl<'a> Descender<'a> {
    pub fn new(config: &'a SearchConfig) -> Self {
        Self { config }
    }

    /// UCB1-TUNED exploration bonus for a move with mean `mean` over `runs`
    /// samples at a node with `ln_total = ln(total runs)`.
    fn exploration_bonus(&self, mean: f64, runs: f64, ln_total: f64) -> f64 {
        let variance = mean * (1.0 - mean) + (2.0 * ln_total / runs).sqrt();
        let variance = variance.min(self.config.variance_cap);
        self.config.exploration * (ln_total / runs * variance).sqrt()
    }

    /// Selection score of `mv` at `node`.
    pub fn score(&self, node: &SearchNode, mv: Move) -> f64 {
        let (runs, wins) = node.experience(mv);
        let rave = self.config.selection == SelectionPolicy::Rave;
        let (rave_runs, rave_wins) = if rave {
            node.rave_experience(mv)
        } else {
            (0.0, 0.0)
        };

        if runs == 0.0 {
            // Unvisited moves fall back on RAVE, then on first-play urgency
            return if rave_runs > 0.0 {
                rave_wins / rave_runs
            } else {
                self.config.first_play_urgency
            };
        }

        let mean = wins / runs;
        let ln_total = f64::from(node.total_runs().max(1)).ln();
        let bonus = self.exploration_bonus(mean, runs, ln_total);

        if rave_runs == 0.0 {
            return mean + bonus;
        }
        let beta = rave_weight(rave_runs, runs, self.config.rave_equiv);
        beta * (rave_wins / rave_runs) + (1.0 - beta) * mean + bonus
    }

    /// The first candidate with the highest score, or `None` if the node has
    /// no candidates.
    pub fn select(&self, node: &SearchNode) -> Option<Move> {
        let mut best = None;
        let mut best_score = f64::NEG_INFINITY;
        for &mv in node.moves() {
            let score = self.score(node, mv);
            if best.is_none() || score > best_score {
                best = Some(mv);
                best_score = score;
            }
        }
        best
    }

    /// Walk the tree from `root`, playing selected moves on `board`.
    ///
    /// Appends one [`PathStep`] and one [`PlayedMove`] per move played.
    /// `board` must be at the root position and both buffers empty.
    pub fn descend<B: Board>(
        &self,
        table: &TranspositionTable,
        board: &mut B,
        root: NodeId,
        path: &mut Vec<PathStep>,
        played: &mut Vec<PlayedMove>,
    ) -> Result<Descent, (Move, B::Illegal)> {
        let mut state = State::InTree(root);
        loop {
            let id = match state {
                State::InTree(id) => id,
                State::Playout(descent) => return Ok(descent),
            };

            if board.turn() >= board.max_game_length() {
                state = State::Playout(Descent::Aborted);
                continue;
            }

            let node = table.node(id);
            let Some(mv) = self.select(node) else {
                // A node without candidates behaves like the frontier
                state = State::Playout(Descent::Frontier { parent: id, mv: board.pass() });
                continue;
            };

            let color = board.color_to_play();
            board.play(mv).map_err(|e| (mv, e))?;
            path.push(PathStep {
                node: id,
                mv,
                color,
                ply: played.len(),
            });
            played.push(PlayedMove { color, mv });

            if board.is_terminal() {
                state = State::Playout(Descent::Terminal);
                continue;
            }

            let child = node.child(mv).or_else(|| {
                let found = table.find(board.fingerprint());
                if let Some(child) = found {
                    node.set_child(mv, child);
                }
                found
            });

            state = match child {
                Some(child) => State::InTree(child),
                None => State::Playout(Descent::Frontier { parent: id, mv }),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Prior;

    fn config() -> SearchConfig {
        SearchConfig::for_testing()
    }

    #[test]
    fn test_rave_weight_decreases_with_runs() {
        let mut last = 1.0;
        for runs in [0.0, 1.0, 10.0, 100.0, 1000.0, 10_000.0] {
            let beta = rave_weight(50.0, runs, 3500.0);
            assert!(beta <= last, "weight must not grow: {beta} > {last}");
            assert!((0.0..=1.0).contains(&beta));
            last = beta;
        }
        assert!((rave_weight(50.0, 0.0, 3500.0) - 1.0).abs() < 1e-12);
        assert_eq!(rave_weight(0.0, 10.0, 3500.0), 0.0);
    }

    #[test]
    fn test_unvisited_move_scores_first_play_urgency() {
        let config = config();
        let descender = Descender::new(&config);
        let node = SearchNode::new(1, &[1, 2], 4, &[]);
        assert!((descender.score(&node, 1) - config.first_play_urgency).abs() < 1e-12);
        assert!(descender.score(&node, 2).is_finite());
    }

    #[test]
    fn test_unvisited_move_uses_rave() {
        let config = config();
        let descender = Descender::new(&config);
        let node = SearchNode::new(1, &[1, 2], 4, &[]);
        node.record_rave_result(2, true);
        node.record_rave_result(2, false);
        node.record_rave_result(2, false);
        node.record_rave_result(2, false);
        assert!((descender.score(&node, 2) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_unvisited_move_with_poor_rave_is_passed_over() {
        let config = config();
        let descender = Descender::new(&config);
        let node = SearchNode::new(1, &[1, 2, 3], 4, &[]);
        for i in 0..20 {
            node.record_result(1, i % 2 == 0);
        }
        for _ in 0..20 {
            node.record_rave_result(2, false);
        }
        // Move 2 has never been run and scores exactly its RAVE rate
        assert_eq!(descender.score(&node, 2), 0.0);
        // Move 3 has nothing at all and takes first-play urgency
        assert_eq!(descender.select(&node), Some(3));
        for _ in 0..20 {
            node.record_result(3, false);
        }
        assert_eq!(descender.select(&node), Some(1));

        // Prior runs give the move an exploration bonus
        let node = SearchNode::new(1, &[1, 2], 4, &[Prior::new(0, 0), Prior::new(2, 0)]);
        for i in 0..20 {
            node.record_result(1, i % 2 == 0);
        }
        for _ in 0..20 {
            node.record_rave_result(2, false);
        }
        assert!(descender.score(&node, 2) > 0.0);
    }

    #[test]
    fn test_ucb_policy_ignores_rave() {
        let config = config().with_selection(SelectionPolicy::Ucb1Tuned);
        let descender = Descender::new(&config);
        let node = SearchNode::new(1, &[1], 4, &[]);
        node.record_rave_result(1, true);
        assert!((descender.score(&node, 1) - config.first_play_urgency).abs() < 1e-12);
    }

    #[test]
    fn test_exploration_bonus_capped() {
        let config = config();
        let descender = Descender::new(&config);
        // With one sample the raw variance term exceeds the cap
        let capped = descender.exploration_bonus(0.5, 1.0, 100f64.ln());
        let expected = config.exploration * (100f64.ln() * config.variance_cap).sqrt();
        assert!((capped - expected).abs() < 1e-12);
    }

    #[test]
    fn test_select_prefers_higher_winrate() {
        let config = config();
        let descender = Descender::new(&config);
        let node = SearchNode::new(1, &[1, 2], 4, &[]);
        for i in 0..50 {
            node.record_result(1, i % 5 == 0);
            node.record_result(2, i % 5 != 0);
        }
        assert_eq!(descender.select(&node), Some(2));
    }

    #[test]
    fn test_select_ties_go_to_first_candidate() {
        let config = config();
        let descender = Descender::new(&config);
        let node = SearchNode::new(1, &[3, 1, 2], 4, &[]);
        assert_eq!(descender.select(&node), Some(3));

        let empty = SearchNode::new(1, &[], 4, &[]);
        assert_eq!(descender.select(&empty), None);
    }
}
