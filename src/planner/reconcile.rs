//! The heuristic reconciler (C8): after the goal (and hence `h`) changes,
//! iteratively rewinds the tree past the earliest expansion whose frozen
//! cost no longer makes sense under the new heuristic.

use crate::planner::context::SearchContext;
use crate::planner::restore::restore_to_step;
use crate::planner::state::{compute_key, INFINITE_COST, NEVER_EXPANDED};
use tracing::info;

/// Repeats "find earliest inconsistent expansion, restore just before it"
/// until no expanded state's new f-value violates the current OPEN front.
/// Terminates because each restore strictly decreases `expansion_step`
/// (bounded below by 0), and a state once rewound past cannot contribute an
/// inconsistency again until it is re-expanded.
pub fn reconcile_heuristic_change(ctx: &mut SearchContext) {
    loop {
        let Some(min_idx) = ctx.open.peek_min() else {
            return;
        };
        let min_f = ctx.pool.get(min_idx).f;
        let min_created = ctx.pool.get(min_idx).created_step;

        let mut earliest_offender: Option<u64> = None;
        for idx in ctx.pool.indices() {
            let state = ctx.pool.get(idx);
            if state.expanded_step == NEVER_EXPANDED {
                continue;
            }
            if state.v == INFINITE_COST {
                continue;
            }
            let cost = compute_key(state.v, state.h, ctx.counters.curr_eps);
            if cost == INFINITE_COST {
                continue;
            }
            if cost > min_f && min_created < state.expanded_step {
                earliest_offender = Some(match earliest_offender {
                    Some(best) => best.min(state.expanded_step),
                    None => state.expanded_step,
                });
            }
        }

        match earliest_offender {
            None => return,
            Some(step) => {
                info!(target_step = step - 1, "heuristic change invalidated an expansion, restoring");
                restore_to_step(ctx, step - 1);
            }
        }
    }
}
