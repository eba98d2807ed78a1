//! The expansion engine (C5): pops the frontier's minimum, freezes its
//! g-value, relaxes every outgoing edge, and routes improved successors into
//! OPEN or INCONS depending on whether they are still live this iteration.

use crate::planner::context::SearchContext;
use crate::planner::graph::{Graph, Heuristic};
use crate::planner::state::{compute_key, HistEntry, StateIdx, INFINITE_COST};
use tracing::debug;

/// Expands `idx`: `ctx.pool.get(idx).g` is assumed already frozen into `v`
/// by the caller (the anytime loop does this right before calling, mirroring
/// the source's `min_state->eg = min_state->g` just before `expand`).
pub fn expand(
    ctx: &mut SearchContext,
    graph: &dyn Graph,
    heuristic: &dyn Heuristic,
    idx: StateIdx,
) {
    let frozen_g = ctx.pool.get(idx).g;
    ctx.pool.get_mut(idx).v = frozen_g;

    let state_id = ctx.pool.get(idx).state_id;
    let successors = graph.get_successors(state_id);
    debug!(state_id, successor_count = successors.len(), "expanding state");

    for (succ_id, cost) in successors {
        let succ_idx = ctx.pool.get_or_create(succ_id);
        ctx.pool
            .reinit(succ_idx, ctx.counters.call_number, heuristic);

        let new_g = if frozen_g == INFINITE_COST || cost == INFINITE_COST {
            INFINITE_COST
        } else {
            frozen_g.saturating_add(cost)
        };

        if new_g >= ctx.pool.get(succ_idx).g {
            continue;
        }

        ctx.pool.get_mut(succ_idx).g = new_g;
        ctx.pool.get_mut(succ_idx).best_pred = Some(idx);
        // History is recorded on the state being improved, appending the
        // parent that produced the improvement (see SPEC_FULL.md design
        // note #2 on the source's inverted storeParent call).
        ctx.pool.get_mut(succ_idx).parent_hist.push(HistEntry {
            parent: idx,
            g: new_g,
            parent_step: ctx.counters.expansion_step,
        });

        if ctx.pool.get(succ_idx).iteration_closed != ctx.counters.iteration {
            let h = ctx.pool.get(succ_idx).h;
            let f = compute_key(new_g, h, ctx.counters.curr_eps);
            ctx.pool.get_mut(succ_idx).f = f;
            if ctx.open.contains(succ_idx) {
                ctx.open.decrease_key(&ctx.pool, succ_idx);
            } else {
                ctx.pool.get_mut(succ_idx).created_step = ctx.counters.expansion_step;
                ctx.seen_states.push(succ_idx);
                ctx.open.push(&ctx.pool, succ_idx);
            }
        } else if !ctx.pool.get(succ_idx).incons {
            ctx.pool.get_mut(succ_idx).incons = true;
            ctx.incons.push(succ_idx);
        }
    }

    ctx.pool.get_mut(idx).expanded_step = ctx.counters.expansion_step;
    ctx.counters.expansion_step += 1;
}
