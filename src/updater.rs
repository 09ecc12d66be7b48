//! Backpropagation of simulation results.
//!
//! Every node on the path records the move chosen there. With RAVE enabled,
//! each node additionally records every move its side to move played later in
//! the simulation, counting only the first time a point was played (by
//! either side) from that node onward.

use crate::descender::{PathStep, PlayedMove};
use crate::game::{Move, Winner};
use crate::table::TranspositionTable;

pub struct TreeUpdater {
    rave: bool,
    pass: Move,
}

impl TreeUpdater {
    /// `pass` is never credited with RAVE statistics.
    pub fn new(rave: bool, pass: Move) -> Self {
        Self { rave, pass }
    }

    /// Write one simulation's outcome into the table.
    ///
    /// `played` holds every move of the simulation; `seen` is scratch space
    /// at least as long as the board's move space and must be all `false`.
    /// It is left all `false` again.
    pub fn update(
        &self,
        table: &TranspositionTable,
        winner: Winner,
        path: &[PathStep],
        played: &[PlayedMove],
        seen: &mut [bool],
    ) {
        let Some(winning) = winner.color() else {
            return;
        };

        for step in path {
            let node = table.node(step.node);
            let won = step.color == winning;
            node.record_result(step.mv, won);

            if !self.rave {
                continue;
            }
            let later = played.get(step.ply..).unwrap_or_default();
            for pm in later {
                let Some(flag) = seen.get_mut(pm.mv) else {
                    continue;
                };
                if *flag {
                    continue;
                }
                *flag = true;
                if pm.color == step.color && pm.mv != self.pass {
                    node.record_rave_result(pm.mv, won);
                }
            }
            for pm in later {
                if let Some(flag) = seen.get_mut(pm.mv) {
                    *flag = false;
                }
            }
        }
    }
}
