//! Search budgets and the shared stop signal.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::error::SearchError;

/// How long a search runs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Budget {
    /// Stop after exactly this many simulations.
    Playouts(u64),
    /// Stop starting simulations once this much wall-clock time has passed.
    Time(Duration),
}

impl Budget {
    pub fn validate(&self) -> Result<(), SearchError> {
        match *self {
            Budget::Playouts(0) => Err(SearchError::EmptyBudget),
            Budget::Time(d) if d.is_zero() => Err(SearchError::EmptyBudget),
            _ => Ok(()),
        }
    }
}

/// Cooperative cancellation shared by the workers of one search.
///
/// Workers ask [`SearchControl::claim`] before each simulation and never
/// abandon one in progress. Playout budgets are handed out as tickets, so the
/// number of simulations started is exact regardless of thread count.
#[derive(Debug)]
pub struct SearchControl {
    stop: AtomicBool,
    started: AtomicU64,
    completed: AtomicU64,
    limit: Option<u64>,
    deadline: Option<Instant>,
}

impl SearchControl {
    pub fn new(budget: Budget) -> Self {
        let (limit, deadline) = match budget {
            Budget::Playouts(n) => (Some(n), None),
            Budget::Time(d) => (None, Some(Instant::now() + d)),
        };
        Self {
            stop: AtomicBool::new(false),
            started: AtomicU64::new(0),
            completed: AtomicU64::new(0),
            limit,
            deadline,
        }
    }

    /// Ask permission to start one more simulation.
    pub fn claim(&self) -> bool {
        if self.stop.load(Ordering::Relaxed) {
            return false;
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                self.stop();
                return false;
            }
        }
        if let Some(limit) = self.limit {
            if self.started.fetch_add(1, Ordering::Relaxed) >= limit {
                self.stop();
                return false;
            }
        }
        true
    }

    /// Report a finished simulation.
    #[inline]
    pub fn finish(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Stop the search after the simulations currently in flight.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Number of simulations finished so far.
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }
}
