//! Bundles the mutable search state (C1–C4 plus the global counters) that the
//! expansion engine, anytime loop, restorer and reconciler all operate on.
//!
//! Per the design notes, `expansion_step`/`iteration`/`call_number` are owned
//! by the planner instance and threaded through explicitly — there is no
//! free-standing global counter anywhere in this crate.

use crate::planner::incons::InconsSet;
use crate::planner::open_heap::OpenHeap;
use crate::planner::state::{StateIdx, StatePool};

/// The epsilon schedule and the bookkeeping counters for the planning call
/// currently in progress.
#[derive(Debug, Clone)]
pub struct Counters {
    pub call_number: u64,
    pub iteration: u64,
    pub expansion_step: u64,
    pub curr_eps: f64,
    pub initial_eps: f64,
    pub final_eps: f64,
    pub delta_eps: f64,
    pub satisfied_eps: f64,
}

impl Default for Counters {
    fn default() -> Self {
        Self {
            call_number: 0,
            iteration: 1,
            expansion_step: 1,
            curr_eps: 1.0,
            initial_eps: 1.0,
            final_eps: 1.0,
            delta_eps: 1.0,
            satisfied_eps: f64::INFINITY,
        }
    }
}

/// C1 (state pool), C2 (open heap), C3 (incons set), the seen-states list
/// half of C4 (the per-state history lives on [`crate::planner::state::SearchState`]
/// itself), and the global counters, all owned together because the
/// restorer and reconciler need to mutate them atomically.
#[derive(Debug, Default)]
pub struct SearchContext {
    pub pool: StatePool,
    pub open: OpenHeap,
    pub incons: InconsSet,
    /// All states ever created in the current planning call, in creation
    /// order.
    pub seen_states: Vec<StateIdx>,
    pub counters: Counters,
}

impl SearchContext {
    pub fn new() -> Self {
        Self::default()
    }
}
