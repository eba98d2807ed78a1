//! The state pool (C1): owns every search-state record ever touched during a
//! planning call and maps graph-state-ids to them.

use crate::planner::graph::Heuristic;

/// An opaque identifier assigned by the external graph.
pub type GraphStateId = usize;

/// A stable index into the [`StatePool`]. Search-states reference each other
/// (parent pointers, history) through this index rather than through raw
/// references, since the history of a state may point back at states that
/// reference it in turn.
pub type StateIdx = usize;

/// Sentinel standing in for an unbounded cost or an expansion step that has
/// not happened yet.
pub const INFINITE_COST: u32 = u32::MAX;

/// Sentinel expansion step meaning "not yet expanded".
pub const NEVER_EXPANDED: u64 = u64::MAX;

/// One improvement of a state's `g`-value, recorded when a relaxation lowers
/// it. `parent_step` is the expansion step the parent will be stamped with
/// once the expansion that produced this improvement finishes (the parent's
/// `E`) — recording it here, rather than reading the parent's live `E` later,
/// is what keeps "is this entry still valid at step k" a local comparison
/// even after the parent itself has since been rewound and re-expanded.
#[derive(Debug, Clone, Copy)]
pub struct HistEntry {
    pub parent: StateIdx,
    pub g: u32,
    pub parent_step: u64,
}

/// One graph state's search bookkeeping. See module docs on [`StatePool`] for
/// lifecycle notes.
#[derive(Debug, Clone)]
pub struct SearchState {
    pub state_id: GraphStateId,
    pub g: u32,
    pub v: u32,
    pub h: u32,
    pub f: u32,
    pub call_number: u64,
    pub iteration_closed: u64,
    pub incons: bool,
    pub best_pred: Option<StateIdx>,
    /// Expansion step at which this state was first created (first inserted
    /// into OPEN).
    pub created_step: u64,
    /// Expansion step at which this state was expanded, [`NEVER_EXPANDED`] if
    /// it hasn't been yet.
    pub expanded_step: u64,
    pub parent_hist: Vec<HistEntry>,
}

impl SearchState {
    fn fresh(state_id: GraphStateId) -> Self {
        Self {
            state_id,
            g: INFINITE_COST,
            v: INFINITE_COST,
            h: INFINITE_COST,
            f: INFINITE_COST,
            call_number: 0,
            iteration_closed: 0,
            incons: false,
            best_pred: None,
            created_step: NEVER_EXPANDED,
            expanded_step: NEVER_EXPANDED,
            parent_hist: Vec::new(),
        }
    }
}

/// Owns all search-state records, keyed by the graph's state ids through a
/// dense direct-index map. Every other component (open heap, incons set,
/// expansion engine, restorer, reconciler) holds only [`StateIdx`]s into this
/// pool, never a `SearchState` by value.
#[derive(Debug, Default)]
pub struct StatePool {
    states: Vec<SearchState>,
    id_to_idx: Vec<Option<StateIdx>>,
}

impl StatePool {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the existing search-state for `state_id`, creating one
    /// (uninitialised beyond its defaults) if this is the first time it has
    /// been referenced.
    pub fn get_or_create(&mut self, state_id: GraphStateId) -> StateIdx {
        if self.id_to_idx.len() <= state_id {
            self.id_to_idx.resize(state_id + 1, None);
        }
        if let Some(idx) = self.id_to_idx[state_id] {
            return idx;
        }
        let idx = self.states.len();
        self.states.push(SearchState::fresh(state_id));
        self.id_to_idx[state_id] = Some(idx);
        idx
    }

    pub fn get(&self, idx: StateIdx) -> &SearchState {
        &self.states[idx]
    }

    pub fn get_mut(&mut self, idx: StateIdx) -> &mut SearchState {
        &mut self.states[idx]
    }

    /// Iterates over every state index currently in the pool, in creation
    /// order (i.e. pool index order, not [`StatePool::get_or_create`] call
    /// order across restores).
    pub fn indices(&self) -> impl Iterator<Item = StateIdx> {
        0..self.states.len()
    }

    /// Lazily (re)initialises `idx` if it was last touched in a different
    /// planning call. History is deliberately left untouched: it is only
    /// ever trimmed by the tree restorer (§4.7).
    pub fn reinit(&mut self, idx: StateIdx, call_number: u64, heuristic: &dyn Heuristic) {
        let state = &mut self.states[idx];
        if state.call_number == call_number {
            return;
        }
        state.g = INFINITE_COST;
        state.v = INFINITE_COST;
        state.f = INFINITE_COST;
        state.h = heuristic.goal_heuristic(state.state_id);
        state.iteration_closed = 0;
        state.best_pred = None;
        state.incons = false;
        state.call_number = call_number;
    }

    /// Releases every state and forgets the id mapping. Used by
    /// [`crate::planner::planner::Planner::force_planning_from_scratch_and_free_memory`].
    pub fn reset_all(&mut self) {
        self.states.clear();
        self.states.shrink_to_fit();
        self.id_to_idx.clear();
        self.id_to_idx.shrink_to_fit();
    }
}

/// `f = g + floor(eps * h)`, saturating to [`INFINITE_COST`] if either input
/// already is.
pub fn compute_key(g: u32, h: u32, eps: f64) -> u32 {
    if g == INFINITE_COST || h == INFINITE_COST {
        return INFINITE_COST;
    }
    let inflated = (eps * h as f64).floor();
    g.saturating_add(inflated as u32)
}
