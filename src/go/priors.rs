//! Heuristic priors for freshly created Go search nodes.
//!
//! Every move starts with `PRIOR_EVEN` runs at an even winrate. Bonuses are
//! added as wins (raising the winrate), penalties as runs without wins.

use super::board::{GoBoard, PASS};
use super::patterns::pat3_match;
use crate::constants::{
    PRIOR_CAPTURE_MANY, PRIOR_CAPTURE_ONE, PRIOR_CFG, PRIOR_EMPTYAREA, PRIOR_EVEN, PRIOR_PAT3,
    PRIOR_SELFATARI,
};
use crate::game::{Move, Prior, PriorSource};

#[derive(Copy, Clone, Debug, Default)]
pub struct HeuristicPriors;

impl HeuristicPriors {
    fn prior_for(board: &GoBoard, pt: Move, cfg_map: Option<&[i8]>) -> Prior {
        if pt == PASS {
            // Passing is rarely right while the game is still open
            return Prior::new(PRIOR_EVEN, 0);
        }
        let mut prior = Prior::new(PRIOR_EVEN, PRIOR_EVEN / 2);

        // Moves near the last move
        if let Some(cfg) = cfg_map {
            let dist = cfg.get(pt).copied().unwrap_or(-1);
            if dist >= 1 && (dist as usize) <= PRIOR_CFG.len() {
                bonus(&mut prior, PRIOR_CFG[(dist - 1) as usize]);
            }
        }

        if pat3_match(board, pt) {
            bonus(&mut prior, PRIOR_PAT3);
        }

        match board.capture_size(pt) {
            0 => {}
            1 => bonus(&mut prior, PRIOR_CAPTURE_ONE),
            _ => bonus(&mut prior, PRIOR_CAPTURE_MANY),
        }

        if board.is_self_atari(pt) {
            prior.runs += PRIOR_SELFATARI;
        }

        // First and second line moves far from any stone; the third line is fine
        let height = board.line_height(pt);
        if height <= 2 && board.empty_area(pt, 3) {
            prior.runs += PRIOR_EMPTYAREA;
            if height == 2 {
                prior.wins += PRIOR_EMPTYAREA;
            }
        }
        prior
    }
}

fn bonus(prior: &mut Prior, amount: u32) {
    prior.runs += amount;
    prior.wins += amount;
}

impl PriorSource<GoBoard> for HeuristicPriors {
    fn priors(&self, board: &GoBoard, moves: &[Move], out: &mut [Prior]) {
        let last = board.last_move();
        let cfg_map = (last != PASS).then(|| board.cfg_distances(last));
        for (prior, &mv) in out.iter_mut().zip(moves) {
            *prior = Self::prior_for(board, mv, cfg_map.as_deref());
        }
    }
}
