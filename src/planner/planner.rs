//! The planner surface: the handful of calls an external driver makes
//! (`set_start`, `set_goal`, `replan`, the `force_planning_from_scratch*`
//! family) wrapping the anytime loop, tree restorer and heuristic
//! reconciler defined in the sibling modules.

use crate::planner::anytime::{run_anytime_loop, ImproveResult};
use crate::planner::graph::{Graph, Heuristic};
use crate::planner::params::{ReplanOutcome, Solution, TimeParameters};
use crate::planner::reconcile::reconcile_heuristic_change;
use crate::planner::restore::restore_to_step;
use crate::planner::state::{compute_key, GraphStateId, StateIdx, INFINITE_COST, NEVER_EXPANDED};
use crate::planner::context::{Counters, SearchContext};
use tracing::{info, instrument};

/// A generic, anytime, time-bounded heuristic search planner over a `Graph`
/// and `Heuristic` capability bundle, with search-tree restoration to any
/// past expansion checkpoint.
///
/// `Planner` is generic over its collaborators (per SPEC_FULL.md §9) rather
/// than holding them as trait objects, since a given driver binds to exactly
/// one graph/heuristic pair for the lifetime of the planner.
#[derive(Debug)]
pub struct Planner<G: Graph, H: Heuristic> {
    graph: G,
    heuristic: H,
    ctx: SearchContext,
    start_id: Option<GraphStateId>,
    goal_id: Option<GraphStateId>,
    last_start_id: Option<GraphStateId>,
    last_goal_id: Option<GraphStateId>,
    time_params: TimeParameters,
    allow_partial_solutions: bool,
}

impl<G: Graph, H: Heuristic> Planner<G, H> {
    pub fn new(graph: G, heuristic: H) -> Self {
        Self {
            graph,
            heuristic,
            ctx: SearchContext::new(),
            start_id: None,
            goal_id: None,
            last_start_id: None,
            last_goal_id: None,
            time_params: TimeParameters::default(),
            allow_partial_solutions: false,
        }
    }

    pub fn set_start(&mut self, state_id: GraphStateId) {
        self.start_id = Some(state_id);
    }

    pub fn set_goal(&mut self, state_id: GraphStateId) {
        self.goal_id = Some(state_id);
    }

    pub fn set_allow_partial_solutions(&mut self, allow: bool) {
        self.allow_partial_solutions = allow;
    }

    /// Toggles between "stop at the first solution" and "keep improving
    /// until `final_eps` or the budget runs out".
    pub fn set_search_mode(&mut self, first_solution_only: bool) {
        self.time_params.bounded = !first_solution_only;
        self.time_params.improve = !first_solution_only;
    }

    pub fn set_time_params(&mut self, time_params: TimeParameters) {
        self.time_params = time_params;
    }

    pub fn set_epsilon_schedule(&mut self, initial_eps: f64, final_eps: f64, delta_eps: f64) {
        self.ctx.counters.initial_eps = initial_eps;
        self.ctx.counters.final_eps = final_eps;
        self.ctx.counters.delta_eps = delta_eps;
    }

    /// Invalidates the cached start/goal ids so the next `replan` call
    /// reinitialises the search from scratch, without releasing any
    /// allocated states.
    pub fn force_planning_from_scratch(&mut self) {
        self.last_start_id = None;
        self.last_goal_id = None;
    }

    /// As above, but also releases the state pool and open heap, so the
    /// next `replan` call starts with an empty history.
    pub fn force_planning_from_scratch_and_free_memory(&mut self) {
        self.force_planning_from_scratch();
        self.ctx.open.clear();
        self.ctx.incons.clear(&mut self.ctx.pool);
        self.ctx.pool.reset_all();
        self.ctx.seen_states.clear();
        self.ctx.counters = Counters::default();
    }

    #[instrument(skip(self))]
    pub fn replan(&mut self) -> (ReplanOutcome, Option<Solution>) {
        let (Some(start_id), Some(goal_id)) = (self.start_id, self.goal_id) else {
            return if self.start_id.is_none() {
                (ReplanOutcome::StartNotSet, None)
            } else {
                (ReplanOutcome::GoalNotSet, None)
            };
        };

        let start_idx = self.ctx.pool.get_or_create(start_id);
        let goal_idx = self.ctx.pool.get_or_create(goal_id);

        let goal_changed = self.last_goal_id != Some(goal_id);
        if goal_changed {
            // Repoint the heuristic's own notion of goal before anything
            // below (re)consults it, so `begin_fresh_search`'s reinit and
            // `recompute_all_heuristics` both see the new goal's h-values.
            self.heuristic.set_goal(goal_id);
        }

        if self.last_start_id != Some(start_id) {
            self.begin_fresh_search(start_idx, goal_idx);
            self.last_start_id = Some(start_id);
        } else if goal_changed {
            info!("goal changed, reconciling heuristic");
            self.recompute_all_heuristics();
            self.ctx.open.reheapify_all(&self.ctx.pool);
            reconcile_heuristic_change(&mut self.ctx);
        }
        self.last_goal_id = Some(goal_id);

        let (result, _expansions) = run_anytime_loop(
            &mut self.ctx,
            &self.graph,
            &self.heuristic,
            goal_idx,
            &self.time_params,
        );

        if self.ctx.counters.satisfied_eps.is_infinite() {
            if self.allow_partial_solutions {
                if let Some(frontier_idx) = self.ctx.open.peek_min() {
                    return (
                        ReplanOutcome::PartialSuccess,
                        Some(self.extract_path(frontier_idx)),
                    );
                }
            }
            let outcome = match result {
                ImproveResult::TimedOut => ReplanOutcome::TimedOut,
                ImproveResult::ExhaustedOpenList => ReplanOutcome::ExhaustedOpenList,
                ImproveResult::Success => unreachable!(
                    "satisfied_eps stays infinite only if no iteration succeeded"
                ),
            };
            return (outcome, None);
        }

        (ReplanOutcome::Success, Some(self.extract_path(goal_idx)))
    }

    fn begin_fresh_search(&mut self, start_idx: StateIdx, goal_idx: StateIdx) {
        info!("start changed, reinitializing search");
        self.ctx.open.clear();
        self.ctx.incons.clear(&mut self.ctx.pool);
        self.ctx.counters.call_number += 1;

        self.ctx
            .pool
            .reinit(start_idx, self.ctx.counters.call_number, &self.heuristic);
        self.ctx
            .pool
            .reinit(goal_idx, self.ctx.counters.call_number, &self.heuristic);

        self.ctx.counters.iteration = 1;
        self.ctx.counters.expansion_step = 1;
        self.ctx.counters.curr_eps = self.ctx.counters.initial_eps;
        self.ctx.counters.satisfied_eps = f64::INFINITY;
        self.ctx.seen_states.clear();

        let state = self.ctx.pool.get_mut(start_idx);
        state.g = 0;
        state.created_step = 0;
        state.expanded_step = NEVER_EXPANDED;
        let h = state.h;
        state.f = compute_key(0, h, self.ctx.counters.curr_eps);

        self.ctx.seen_states.push(start_idx);
        self.ctx.open.push(&self.ctx.pool, start_idx);
    }

    fn recompute_all_heuristics(&mut self) {
        for idx in self.ctx.pool.indices() {
            let state_id = self.ctx.pool.get(idx).state_id;
            let h = self.heuristic.goal_heuristic(state_id);
            let state = self.ctx.pool.get_mut(idx);
            state.h = h;
            if state.g != INFINITE_COST {
                state.f = compute_key(state.g, h, self.ctx.counters.curr_eps);
            }
        }
    }

    fn extract_path(&self, to_idx: StateIdx) -> Solution {
        let mut path = Vec::new();
        let mut current = Some(to_idx);
        while let Some(idx) = current {
            path.push(self.ctx.pool.get(idx).state_id);
            current = self.ctx.pool.get(idx).best_pred;
        }
        path.reverse();
        Solution {
            path,
            cost: self.ctx.pool.get(to_idx).g,
        }
    }

    /// Rewinds the search tree to the snapshot immediately after expansion
    /// step `k`. Exposed for callers that want to drive reconciliation
    /// themselves (tests, or a future edge-cost-change handler).
    pub fn restore_to_step(&mut self, k: u64) {
        restore_to_step(&mut self.ctx, k);
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    pub fn heuristic(&self) -> &H {
        &self.heuristic
    }

    /// The smallest epsilon for which a solution has been found so far in
    /// the current planning call (`f64::INFINITY` if none yet).
    pub fn satisfied_eps(&self) -> f64 {
        self.ctx.counters.satisfied_eps
    }

    pub fn current_epsilon(&self) -> f64 {
        self.ctx.counters.curr_eps
    }

    pub fn expansion_step(&self) -> u64 {
        self.ctx.counters.expansion_step
    }
}
