//! The graph and heuristic are external collaborators of the planner: the
//! search core never inspects what a state "means", only what it costs to
//! leave it and how far it is believed to be from the goal.

use crate::planner::state::GraphStateId;
use std::io::Write;

/// Successor relation of the state space being searched. Costs are
/// non-negative; the planner represents "no edge"/"unreachable" with
/// [`crate::planner::state::INFINITE_COST`], not with this trait.
pub trait Graph {
    /// Returns the successors of `state_id` and the cost of the edge to each.
    fn get_successors(&self, state_id: GraphStateId) -> Vec<(GraphStateId, u32)>;

    /// Returns the predecessors of `state_id` and the cost of the edge from
    /// each. Only needed by a backward search; the forward search in this
    /// crate never calls it.
    fn get_predecessors(&self, _state_id: GraphStateId) -> Vec<(GraphStateId, u32)> {
        Vec::new()
    }

    /// Writes a human-readable description of `state_id` to `out`, used by
    /// diagnostic logging.
    fn print_state(&self, state_id: GraphStateId, verbose: bool, out: &mut dyn Write);
}

/// Heuristic oracle: an estimate of the cost from `state_id` to whatever goal
/// the collaborator is currently configured with. The planner treats the
/// heuristic as opaque and reconsults it whenever the goal changes.
pub trait Heuristic {
    fn goal_heuristic(&self, state_id: GraphStateId) -> u32;

    /// Informs the heuristic that the planner's goal changed, so it can
    /// repoint whatever internal notion of "goal" it evaluates against.
    /// Default is a no-op for heuristics with no goal-dependent state (e.g. a
    /// zero heuristic). `Planner::replan` calls this before recomputing any
    /// cached `h` values, so [`Heuristic::goal_heuristic`] always reflects
    /// the new goal by the time the reconciler runs.
    fn set_goal(&mut self, _goal_id: GraphStateId) {}
}
