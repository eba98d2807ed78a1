//! The tree restorer (C7): rewinds the search tree to the snapshot implied
//! by expansion step `k`, using each state's append-only improvement
//! history.

use crate::planner::context::SearchContext;
use crate::planner::state::{compute_key, StateIdx, INFINITE_COST, NEVER_EXPANDED};
use tracing::debug;

/// Picks the parent-history entry that is still valid at step `k` — the one
/// with the greatest `parent_step` not exceeding `k` — purging every entry
/// that is no longer valid in the same pass. Returns `None` if no entry
/// survives, meaning the state should be treated as not yet created at `k`.
fn select_latest_parent(
    ctx: &mut SearchContext,
    idx: StateIdx,
    k: u64,
) -> Option<(StateIdx, u32)> {
    let state = ctx.pool.get_mut(idx);
    state.parent_hist.retain(|entry| entry.parent_step <= k);
    state
        .parent_hist
        .iter()
        .max_by_key(|entry| entry.parent_step)
        .map(|entry| (entry.parent, entry.g))
}

/// Rewinds every seen state to its value as of immediately after expansion
/// step `k`. `k == 0` means "before the first expansion ever happened",
/// i.e. a fresh search from the start state.
pub fn restore_to_step(ctx: &mut SearchContext, k: u64) {
    debug!(k, "restoring search tree");
    ctx.open.clear();
    ctx.incons.clear(&mut ctx.pool);

    if k == 0 {
        reinitialize_from_start(ctx);
        return;
    }

    let seen = std::mem::take(&mut ctx.seen_states);
    // By construction (see Planner::begin_fresh_search) the start state is
    // always seen_states[0]. It never goes through expand()'s relaxation
    // code, so it never accumulates a parent_hist entry; handle it
    // separately rather than running it through select_latest_parent, which
    // would find nothing to restore and panic.
    let start_idx = seen[0];
    let mut kept = Vec::with_capacity(seen.len());

    for idx in seen {
        let expanded_step = ctx.pool.get(idx).expanded_step;
        let created_step = ctx.pool.get(idx).created_step;

        if idx == start_idx {
            let state = ctx.pool.get_mut(idx);
            state.g = 0;
            state.best_pred = None;
            if expanded_step <= k {
                kept.push(idx);
            } else {
                state.v = INFINITE_COST;
                state.expanded_step = NEVER_EXPANDED;
                let h = state.h;
                state.f = compute_key(0, h, ctx.counters.curr_eps);
                ctx.open.push(&ctx.pool, idx);
                kept.push(idx);
            }
            continue;
        }

        if expanded_step <= k {
            // Created and expanded at or before k: stays closed.
            let (parent, g) = select_latest_parent(ctx, idx, k)
                .expect("an expanded state must have a valid parent history entry at its own step");
            let state = ctx.pool.get_mut(idx);
            state.g = g;
            state.best_pred = Some(parent);
            kept.push(idx);
        } else if created_step <= k {
            // Created but not yet expanded at k: goes back into OPEN.
            let (parent, g) = select_latest_parent(ctx, idx, k)
                .expect("a created state must have a valid parent history entry at its own step");
            let state = ctx.pool.get_mut(idx);
            state.g = g;
            state.v = INFINITE_COST;
            state.best_pred = Some(parent);
            state.expanded_step = NEVER_EXPANDED;
            let h = state.h;
            state.f = compute_key(g, h, ctx.counters.curr_eps);
            ctx.open.push(&ctx.pool, idx);
            kept.push(idx);
        } else {
            // Not yet created at k: wipe it back to its pristine state.
            let state = ctx.pool.get_mut(idx);
            state.v = INFINITE_COST;
            state.g = INFINITE_COST;
            state.f = INFINITE_COST;
            state.created_step = NEVER_EXPANDED;
            state.expanded_step = NEVER_EXPANDED;
            state.best_pred = None;
            state.incons = false;
            state.parent_hist.clear();
        }
    }

    ctx.seen_states = kept;
    ctx.counters.expansion_step = k + 1;
}

/// `k == 0` case: the tree is reset to "only the start state exists".
fn reinitialize_from_start(ctx: &mut SearchContext) {
    // The start state is always seen_states[0] by construction (see
    // Planner::begin_fresh_search); every other seen state is simply
    // discarded, matching the source's InitializeSearch which only ever
    // knows about the start state.
    let start_idx = ctx.seen_states[0];
    ctx.seen_states.clear();

    let state = ctx.pool.get_mut(start_idx);
    state.g = 0;
    state.v = INFINITE_COST;
    state.best_pred = None;
    state.created_step = 0;
    state.expanded_step = NEVER_EXPANDED;
    state.parent_hist.clear();
    let h = state.h;
    state.f = compute_key(0, h, ctx.counters.curr_eps);

    ctx.seen_states.push(start_idx);
    ctx.open.push(&ctx.pool, start_idx);
    ctx.counters.expansion_step = 1;
}
