//! The search orchestrator.
//!
//! A [`Player`] owns the real board, the transposition table and a fixed pool
//! of [`Worker`]s. [`Player::search`] runs the workers on scoped threads until
//! the budget is spent, then picks the root move with the most runs.
//! [`Player::commit_move`] advances the real board and clears the table.

use std::thread;
use std::time::Instant;

use log::{debug, info, warn};

use crate::budget::{Budget, SearchControl};
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::game::{Board, Move, PlayoutPolicy, PriorSource, Scorer};
use crate::node::SearchNode;
use crate::table::{NodeId, TranspositionTable};
use crate::worker::{SearchContext, Worker};

/// Root statistics for one candidate move.
#[derive(Clone, Debug, PartialEq)]
pub struct MoveStatistics {
    pub mv: Move,
    pub runs: u32,
    pub wins: u32,
    /// Winrate including priors.
    pub win_rate: f64,
    pub rave_runs: u32,
    pub rave_win_rate: f64,
}

pub struct Player<B: Board, P: PlayoutPolicy<B>> {
    config: SearchConfig,
    board: B,
    table: TranspositionTable,
    workers: Vec<Worker<B, P>>,
    scorer: Box<dyn Scorer<B>>,
    priors: Box<dyn PriorSource<B>>,
    playouts_completed: u64,
}

impl<B: Board, P: PlayoutPolicy<B>> Player<B, P> {
    /// Build a player with `config.threads` workers, each holding its own
    /// clone of `policy`.
    pub fn new(
        config: SearchConfig,
        board: B,
        policy: P,
        scorer: impl Scorer<B> + 'static,
        priors: impl PriorSource<B> + 'static,
    ) -> Result<Self, SearchError> {
        config.validate()?;

        let base_seed = config.seed.unwrap_or_else(|| fastrand::u64(..));
        let workers = (0..config.threads)
            .map(|id| {
                let seed = base_seed.wrapping_add(id as u64);
                Worker::new(id, board.clone(), policy.clone(), seed)
            })
            .collect();

        Ok(Self {
            table: TranspositionTable::new(config.table_capacity, config.table_shards),
            config,
            board,
            workers,
            scorer: Box::new(scorer),
            priors: Box::new(priors),
            playouts_completed: 0,
        })
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn table(&self) -> &TranspositionTable {
        &self.table
    }

    /// Total simulations run since this player was created.
    pub fn playouts_completed(&self) -> u64 {
        self.playouts_completed
    }

    /// Replace the real board, e.g. for a new game. Clears the table.
    pub fn set_board(&mut self, board: B) {
        self.board = board;
        self.table.reset();
    }

    /// Play `mv` on the real board and forget the search tree.
    pub fn commit_move(&mut self, mv: Move) -> Result<(), SearchError> {
        self.board.play(mv).map_err(|e| SearchError::IllegalMove {
            mv,
            reason: e.to_string(),
        })?;
        self.table.reset();
        Ok(())
    }

    /// Node for the real board, created if necessary.
    fn root(&self) -> Option<NodeId> {
        self.table.find_or_insert(self.board.fingerprint(), || {
            SearchNode::for_board(&self.board, self.priors.as_ref())
        })
    }

    /// Search the real board within `budget` and return the move with the
    /// most runs at the root. Falls back to passing if no root move has been
    /// run.
    pub fn search(&mut self, budget: Budget) -> Result<Move, SearchError> {
        budget.validate()?;
        let pass = self.board.pass();
        if self.board.is_terminal() {
            debug!("search requested on a finished game; passing");
            return Ok(pass);
        }
        let Some(root) = self.root() else {
            warn!("no room in the transposition table for the root; passing");
            return Ok(pass);
        };

        debug!(
            "search: {:?} with {} workers, {} nodes in table",
            budget,
            self.workers.len(),
            self.table.len()
        );
        let start = Instant::now();
        let control = SearchControl::new(budget);
        let ctx = SearchContext {
            table: &self.table,
            config: &self.config,
            root_board: &self.board,
            root,
            scorer: self.scorer.as_ref(),
            priors: self.priors.as_ref(),
        };

        thread::scope(|s| {
            for worker in self.workers.iter_mut() {
                let ctx = &ctx;
                let control = &control;
                s.spawn(move || worker.run(ctx, control));
            }
        });

        let playouts = control.completed();
        self.playouts_completed += playouts;
        let elapsed = start.elapsed();
        info!(
            "{} playouts in {:.3}s ({:.0}/s), {} nodes",
            playouts,
            elapsed.as_secs_f64(),
            playouts as f64 / elapsed.as_secs_f64().max(1e-9),
            self.table.len()
        );

        match self.table.node(root).most_visited_move() {
            Some(mv) => Ok(mv),
            None => {
                warn!("no root move was run during the search; passing");
                Ok(pass)
            }
        }
    }

    /// Statistics for every candidate at the root, in candidate order.
    /// Empty if the root has not been searched.
    pub fn root_statistics(&self) -> Vec<MoveStatistics> {
        let Some(node) = self.table.find_node(self.board.fingerprint()) else {
            return Vec::new();
        };
        node.moves()
            .iter()
            .map(|&mv| MoveStatistics {
                mv,
                runs: node.runs(mv),
                wins: node.wins(mv),
                win_rate: node.win_rate(mv),
                rave_runs: node.rave_runs(mv),
                rave_win_rate: node.rave_win_rate(mv),
            })
            .collect()
    }

    /// Winrate of `mv` at the root, from the perspective of the side to move.
    pub fn root_win_rate(&self, mv: Move) -> Option<f64> {
        self.table
            .find_node(self.board.fingerprint())
            .map(|node| node.win_rate(mv))
    }

    /// The most-visited line from the root, up to `depth` moves.
    pub fn principal_variation(&self, depth: usize) -> Vec<Move> {
        let mut line = Vec::with_capacity(depth);
        let mut board = self.board.clone();
        let mut node = self.table.find_node(board.fingerprint());

        while let Some(current) = node {
            if line.len() >= depth {
                break;
            }
            let Some(mv) = current.most_visited_move() else {
                break;
            };
            if board.play(mv).is_err() {
                break;
            }
            line.push(mv);
            if board.is_terminal() {
                break;
            }
            node = match current.child(mv) {
                Some(id) => Some(self.table.node(id)),
                None => self.table.find_node(board.fingerprint()),
            };
        }
        line
    }
}
