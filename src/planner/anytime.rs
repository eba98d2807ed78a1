//! The anytime loop (C6): shrinks epsilon from `initial_eps` down to
//! `final_eps`, re-admitting INCONS between iterations, and calling the
//! expansion engine until a solution is found, the open list is exhausted,
//! or the budget runs out.

use crate::planner::context::SearchContext;
use crate::planner::engine::expand;
use crate::planner::graph::{Graph, Heuristic};
use crate::planner::params::{BudgetKind, TimeParameters};
use crate::planner::state::{compute_key, StateIdx, INFINITE_COST};
use std::time::{Duration, Instant};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImproveResult {
    Success,
    TimedOut,
    ExhaustedOpenList,
}

/// Whether the current call has run out of its budget. Unbounded calls never
/// time out; bounded calls compare against the `_init` limit until the first
/// solution of this call is found, and the steady-state limit after.
fn timed_out(
    time_params: &TimeParameters,
    satisfied_eps: f64,
    expansions: u64,
    elapsed: Duration,
) -> bool {
    if !time_params.bounded {
        return false;
    }
    let searching_for_first_solution = satisfied_eps.is_infinite();
    match time_params.kind {
        BudgetKind::Expansions => {
            let limit = if searching_for_first_solution {
                time_params.max_expansions_init
            } else {
                time_params.max_expansions
            };
            expansions >= limit
        }
        BudgetKind::Time => {
            let limit = if searching_for_first_solution {
                time_params.max_allowed_time_init
            } else {
                time_params.max_allowed_time
            };
            elapsed >= limit
        }
    }
}

/// Expands states to improve the current solution until a solution within
/// the current suboptimality bound is found, time runs out, or OPEN is
/// drained.
pub fn improve_path(
    ctx: &mut SearchContext,
    graph: &dyn Graph,
    heuristic: &dyn Heuristic,
    goal_idx: StateIdx,
    time_params: &TimeParameters,
    start_time: Instant,
    expansions: &mut u64,
) -> ImproveResult {
    loop {
        let Some(min_idx) = ctx.open.peek_min() else {
            return ImproveResult::ExhaustedOpenList;
        };

        let min_f = ctx.pool.get(min_idx).f;
        let goal_f = ctx.pool.get(goal_idx).f;
        if min_f >= goal_f || min_idx == goal_idx {
            return ImproveResult::Success;
        }

        let elapsed = start_time.elapsed();
        if timed_out(time_params, ctx.counters.satisfied_eps, *expansions, elapsed) {
            return ImproveResult::TimedOut;
        }

        let popped = ctx.open.pop_min().expect("peeked state must still be poppable");
        debug_assert_eq!(popped, min_idx);
        let state = ctx.pool.get_mut(popped);
        debug_assert_ne!(
            state.iteration_closed, ctx.counters.iteration,
            "a state must not be expanded twice within the same iteration"
        );
        debug_assert_ne!(state.g, INFINITE_COST, "a reachable state must have a finite g");
        state.iteration_closed = ctx.counters.iteration;

        expand(ctx, graph, heuristic, popped);
        *expansions += 1;
    }
}

/// Moves every state out of INCONS back into OPEN, clearing their incons
/// flags, and re-heapifies against the (now lower) epsilon.
fn begin_new_iteration(ctx: &mut SearchContext) {
    ctx.counters.iteration += 1;
    ctx.counters.curr_eps = (ctx.counters.curr_eps - ctx.counters.delta_eps)
        .max(ctx.counters.final_eps);

    for idx in ctx.incons.drain(&mut ctx.pool) {
        ctx.open.push(&ctx.pool, idx);
    }

    for idx in ctx.pool.indices() {
        let state = ctx.pool.get(idx);
        if ctx.open.contains(idx) {
            let h = state.h;
            let g = state.g;
            let f = compute_key(g, h, ctx.counters.curr_eps);
            ctx.pool.get_mut(idx).f = f;
        }
    }
    ctx.open.reheapify_all(&ctx.pool);

    info!(
        iteration = ctx.counters.iteration,
        epsilon = ctx.counters.curr_eps,
        "begin new search iteration"
    );
}

/// Drives the anytime loop: `while satisfied_eps > final_eps`, improving the
/// path at the current epsilon and stepping epsilon down between
/// iterations. Returns the last [`ImproveResult`] seen (informative only
/// once the loop exits without reaching `final_eps`) and the accumulated
/// expansion count across every iteration of this call.
pub fn run_anytime_loop(
    ctx: &mut SearchContext,
    graph: &dyn Graph,
    heuristic: &dyn Heuristic,
    goal_idx: StateIdx,
    time_params: &TimeParameters,
) -> (ImproveResult, u64) {
    let start_time = Instant::now();
    let mut total_expansions: u64 = 0;
    let mut last_result = ImproveResult::ExhaustedOpenList;

    while ctx.counters.satisfied_eps > ctx.counters.final_eps {
        if ctx.counters.curr_eps == ctx.counters.satisfied_eps {
            if !time_params.improve {
                break;
            }
            begin_new_iteration(ctx);
        }

        let mut expansions_this_iteration = 0u64;
        last_result = improve_path(
            ctx,
            graph,
            heuristic,
            goal_idx,
            time_params,
            start_time,
            &mut expansions_this_iteration,
        );
        total_expansions += expansions_this_iteration;

        if last_result != ImproveResult::Success {
            break;
        }

        info!(epsilon = ctx.counters.curr_eps, "improved solution");
        ctx.counters.satisfied_eps = ctx.counters.curr_eps;
    }

    (last_result, total_expansions)
}
