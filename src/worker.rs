//! Worker threads performing Monte Carlo runs.
//!
//! A [`Worker`] owns a private board, a playout policy and a random number
//! generator. Each run copies the real board, descends the shared tree,
//! adds one node at the frontier, plays the rest of the game with the policy,
//! and writes the outcome back into the table.

use log::warn;

use crate::budget::SearchControl;
use crate::config::SearchConfig;
use crate::descender::{Descender, Descent, PathStep, PlayedMove};
use crate::game::{Board, Move, PlayoutPolicy, PriorSource, Scorer, Winner};
use crate::node::SearchNode;
use crate::table::{NodeId, TranspositionTable};
use crate::updater::TreeUpdater;

/// Everything a worker reads during a search. Shared by all workers.
pub struct SearchContext<'a, B: Board> {
    pub table: &'a TranspositionTable,
    pub config: &'a SearchConfig,
    /// The real position the search starts from.
    pub root_board: &'a B,
    /// Node for `root_board`.
    pub root: NodeId,
    pub scorer: &'a dyn Scorer<B>,
    pub priors: &'a dyn PriorSource<B>,
}

pub struct Worker<B: Board, P: PlayoutPolicy<B>> {
    id: usize,
    board: B,
    policy: P,
    rng: fastrand::Rng,
    path: Vec<PathStep>,
    played: Vec<PlayedMove>,
    /// Scratch for the updater's first-play bookkeeping.
    seen: Vec<bool>,
    playouts_completed: u64,
}

impl<B: Board, P: PlayoutPolicy<B>> Worker<B, P> {
    /// `board` only provides storage; every run starts from the context's
    /// root board.
    pub fn new(id: usize, board: B, policy: P, seed: u64) -> Self {
        let seen = vec![false; board.move_space()];
        let capacity = board.max_game_length();
        Self {
            id,
            board,
            policy,
            rng: fastrand::Rng::with_seed(seed),
            path: Vec::with_capacity(capacity),
            played: Vec::with_capacity(capacity),
            seen,
            playouts_completed: 0,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// The worker's private board, as left by the last run.
    pub fn board(&self) -> &B {
        &self.board
    }

    /// Number of runs performed by this worker.
    pub fn playouts_completed(&self) -> u64 {
        self.playouts_completed
    }

    /// Perform runs until `control` refuses another one.
    pub fn run(&mut self, ctx: &SearchContext<'_, B>, control: &SearchControl) {
        while control.claim() {
            self.perform_run(ctx);
            control.finish();
        }
    }

    /// Perform a single Monte Carlo run and incorporate it into the table.
    ///
    /// Returns the winner of the simulation, which is `NoResult` if it was
    /// cut off or discarded.
    pub fn perform_run(&mut self, ctx: &SearchContext<'_, B>) -> Winner {
        self.board.copy_from(ctx.root_board);
        let space = self.board.move_space();
        if self.seen.len() < space {
            self.seen.resize(space, false);
        }
        self.path.clear();
        self.played.clear();
        self.playouts_completed += 1;

        let descender = Descender::new(ctx.config);
        let descent = descender.descend(
            ctx.table,
            &mut self.board,
            ctx.root,
            &mut self.path,
            &mut self.played,
        );

        let winner = match descent {
            Ok(Descent::Terminal) => ctx.scorer.winner(&self.board),
            Ok(Descent::Aborted) => Winner::NoResult,
            Ok(Descent::Frontier { parent, mv }) => {
                let frontier = self.expand(ctx, parent, mv);
                match self.playout(ctx, frontier) {
                    Ok(winner) => winner,
                    Err((mv, e)) => return self.discard(mv, &e),
                }
            }
            Err((mv, e)) => return self.discard(mv, &e),
        };

        if let Some(color) = winner.color() {
            self.policy.learn(&self.played, color);
        }
        let updater = TreeUpdater::new(ctx.config.uses_rave(), self.board.pass());
        updater.update(ctx.table, winner, &self.path, &self.played, &mut self.seen);
        winner
    }

    /// Add the frontier position to the table and link it from its parent.
    ///
    /// Nothing is built once the table is full; the run then keeps no
    /// statistics below the parent.
    fn expand(&self, ctx: &SearchContext<'_, B>, parent: NodeId, mv: Move) -> Option<NodeId> {
        let id = ctx.table.find_or_insert(self.board.fingerprint(), || {
            SearchNode::for_board(&self.board, ctx.priors)
        })?;
        ctx.table.node(parent).set_child(mv, id);
        Some(id)
    }

    /// Play the game to the end beyond the tree.
    ///
    /// The frontier node, if stored, joins the path with the first move
    /// played from it.
    fn playout(
        &mut self,
        ctx: &SearchContext<'_, B>,
        mut frontier: Option<NodeId>,
    ) -> Result<Winner, (Move, B::Illegal)> {
        loop {
            if self.board.is_terminal() {
                return Ok(ctx.scorer.winner(&self.board));
            }
            if self.board.turn() >= self.board.max_game_length() {
                // Probably a long cycle; not worth a result
                return Ok(Winner::NoResult);
            }
            if let Some(color) = ctx.scorer.mercy_winner(&self.board) {
                return Ok(color.into());
            }

            let color = self.board.color_to_play();
            let mv = self.policy.select_move(&self.board, &mut self.rng);
            self.board.play(mv).map_err(|e| (mv, e))?;

            if let Some(node) = frontier.take() {
                self.path.push(PathStep {
                    node,
                    mv,
                    color,
                    ply: self.played.len(),
                });
            }
            self.played.push(PlayedMove { color, mv });
        }
    }

    /// Drop a simulation that hit an illegal move.
    fn discard(&self, mv: Move, error: &B::Illegal) -> Winner {
        if cfg!(debug_assertions) {
            panic!("worker {}: illegal move {mv} during simulation: {error}", self.id);
        }
        warn!(
            "worker {}: illegal move {mv} during simulation ({error}); run discarded",
            self.id
        );
        Winner::NoResult
    }
}
