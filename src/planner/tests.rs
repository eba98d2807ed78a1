//! Tests for the planner core, split into two layers: white-box tests that
//! drive `SearchContext`/`engine`/`restore` directly (these live here since
//! `tests` is a descendant of `planner` and can see its private submodules),
//! and black-box tests that only go through the public `Planner` surface
//! together with the `grid` demo collaborators.

use super::context::{Counters, SearchContext};
use super::engine::expand;
use super::open_heap::OpenHeap;
use super::restore::restore_to_step;
use super::state::{compute_key, StatePool, INFINITE_COST};
use super::{BudgetKind, Planner, ReplanOutcome, TimeParameters};
use crate::grid::{Cell, Grid, ManhattanHeuristic};

fn start_ctx(heuristic: &ManhattanHeuristic, start_id: usize) -> SearchContext {
    let mut ctx = SearchContext {
        pool: StatePool::new(),
        open: OpenHeap::new(),
        incons: super::incons::InconsSet::new(),
        seen_states: Vec::new(),
        counters: Counters::default(),
    };
    // call_number 0 is SearchState::fresh()'s own sentinel for "never
    // touched"; Planner::begin_fresh_search always bumps past it before its
    // first get_or_create/reinit, so this helper does the same.
    ctx.counters.call_number = 1;
    let start_idx = ctx.pool.get_or_create(start_id);
    ctx.pool.reinit(start_idx, ctx.counters.call_number, heuristic);
    let h = ctx.pool.get(start_idx).h;
    ctx.pool.get_mut(start_idx).g = 0;
    ctx.pool.get_mut(start_idx).created_step = 0;
    ctx.pool.get_mut(start_idx).f = compute_key(0, h, ctx.counters.curr_eps);
    ctx.seen_states.push(start_idx);
    ctx.open.push(&ctx.pool, start_idx);
    ctx
}

#[test]
fn state_pool_lazy_reinit_only_resets_on_new_call_number() {
    let grid = Grid::new(3, 3);
    let heuristic = ManhattanHeuristic::new(grid.clone(), Cell::new(2, 2));
    let mut pool = StatePool::new();
    let idx = pool.get_or_create(5);

    pool.reinit(idx, 1, &heuristic);
    pool.get_mut(idx).g = 3;
    pool.reinit(idx, 1, &heuristic);
    assert_eq!(pool.get(idx).g, 3, "same call_number must be a no-op");

    pool.reinit(idx, 2, &heuristic);
    assert_eq!(pool.get(idx).g, INFINITE_COST, "new call_number resets g");
}

#[test]
fn open_heap_decrease_key_changes_pop_order() {
    let grid = Grid::new(1, 3);
    let heuristic = ManhattanHeuristic::new(grid.clone(), Cell::new(0, 2));
    let mut pool = StatePool::new();
    let a = pool.get_or_create(0);
    let b = pool.get_or_create(1);
    pool.reinit(a, 1, &heuristic);
    pool.reinit(b, 1, &heuristic);
    pool.get_mut(a).f = 10;
    pool.get_mut(a).created_step = 0;
    pool.get_mut(b).f = 5;
    pool.get_mut(b).created_step = 1;

    let mut heap = OpenHeap::new();
    heap.push(&pool, a);
    heap.push(&pool, b);
    assert_eq!(heap.peek_min(), Some(b));

    pool.get_mut(a).f = 1;
    heap.decrease_key(&pool, a);
    assert_eq!(heap.peek_min(), Some(a));
    assert!(heap.contains(b));

    assert_eq!(heap.pop_min(), Some(a));
    assert_eq!(heap.pop_min(), Some(b));
    assert!(heap.is_empty());
}

#[test]
fn expand_appends_history_with_the_parents_own_expansion_step() {
    // A 1x3 line: state ids 0, 1, 2 laid out left to right.
    let grid = Grid::new(3, 1);
    let heuristic = ManhattanHeuristic::new(grid.clone(), Cell::new(0, 2));
    let mut ctx = start_ctx(&heuristic, 0);

    let start_idx = ctx.open.pop_min().unwrap();
    expand(&mut ctx, &grid, &heuristic, start_idx);

    let succ_idx = ctx.pool.get_or_create(1);
    let succ = ctx.pool.get(succ_idx);
    assert_eq!(succ.g, 1);
    assert_eq!(succ.parent_hist.len(), 1);
    let entry = succ.parent_hist[0];
    assert_eq!(entry.parent, start_idx);
    assert_eq!(entry.g, 1);
    assert_eq!(
        entry.parent_step,
        ctx.pool.get(start_idx).expanded_step,
        "the recorded parent_step must equal the step the parent gets stamped with"
    );
}

#[test]
fn restore_to_step_reverts_state_to_an_earlier_checkpoint() {
    // A 1x4 line: ids 0..3. Expand twice (0 -> 1, then 1 -> 2), then restore
    // to just after the first expansion; the second successor must vanish
    // and the first must return to "created but not expanded".
    let grid = Grid::new(4, 1);
    let heuristic = ManhattanHeuristic::new(grid.clone(), Cell::new(0, 3));
    let mut ctx = start_ctx(&heuristic, 0);

    let idx0 = ctx.open.pop_min().unwrap();
    expand(&mut ctx, &grid, &heuristic, idx0);
    let idx1 = ctx.open.pop_min().unwrap();
    expand(&mut ctx, &grid, &heuristic, idx1);

    assert_eq!(ctx.counters.expansion_step, 3);
    let idx2 = ctx.pool.get_or_create(2);
    assert_eq!(ctx.pool.get(idx2).g, 2);

    restore_to_step(&mut ctx, 1);

    assert_eq!(ctx.counters.expansion_step, 2);
    assert_eq!(ctx.pool.get(idx0).g, 0);
    assert_eq!(ctx.pool.get(idx0).best_pred, None);
    assert_eq!(ctx.pool.get(idx1).g, 1, "idx1 was created at step 1, stays valid");
    assert_eq!(ctx.pool.get(idx1).expanded_step, super::state::NEVER_EXPANDED);
    assert!(ctx.open.contains(idx1));
    assert_eq!(
        ctx.pool.get(idx2).g,
        INFINITE_COST,
        "idx2 was only created at step 2, must be wiped"
    );
    assert!(!ctx.open.contains(idx2));
}

#[test]
fn restore_to_step_zero_reinitializes_from_start() {
    let grid = Grid::new(3, 1);
    let heuristic = ManhattanHeuristic::new(grid.clone(), Cell::new(0, 2));
    let mut ctx = start_ctx(&heuristic, 0);
    let idx0 = ctx.open.pop_min().unwrap();
    expand(&mut ctx, &grid, &heuristic, idx0);

    restore_to_step(&mut ctx, 0);

    assert_eq!(ctx.seen_states.len(), 1);
    assert_eq!(ctx.counters.expansion_step, 1);
    assert_eq!(ctx.pool.get(idx0).g, 0);
    assert!(ctx.open.contains(idx0));
}

fn unbounded_time_params() -> TimeParameters {
    TimeParameters {
        bounded: false,
        improve: true,
        ..TimeParameters::default()
    }
}

#[test]
fn basic_grid_finds_the_optimal_path() {
    let grid = Grid::new(3, 3);
    let heuristic = ManhattanHeuristic::new(grid.clone(), Cell::new(2, 2));
    let mut planner = Planner::new(grid.clone(), heuristic);
    planner.set_time_params(unbounded_time_params());
    planner.set_start(grid.state_id(Cell::new(0, 0)));
    planner.set_goal(grid.state_id(Cell::new(2, 2)));

    let (outcome, solution) = planner.replan();
    assert_eq!(outcome, ReplanOutcome::Success);
    let solution = solution.unwrap();
    assert_eq!(solution.cost, 4);
    assert_eq!(solution.path.len(), 5);
    assert_eq!(solution.path.first(), Some(&grid.state_id(Cell::new(0, 0))));
    assert_eq!(solution.path.last(), Some(&grid.state_id(Cell::new(2, 2))));
}

#[test]
fn blocked_corridor_forces_a_longer_detour() {
    // A 4x3 grid (width x height) with column 1 blocked for rows 0 and 1;
    // only row 2 lets traffic through to the other side.
    let blocked = [Cell::new(0, 1), Cell::new(1, 1)];
    let grid = Grid::with_blocked(4, 3, &blocked);
    let heuristic = ManhattanHeuristic::new(grid.clone(), Cell::new(0, 3));
    let mut planner = Planner::new(grid.clone(), heuristic);
    planner.set_time_params(unbounded_time_params());
    planner.set_start(grid.state_id(Cell::new(0, 0)));
    planner.set_goal(grid.state_id(Cell::new(0, 3)));

    let (outcome, solution) = planner.replan();
    assert_eq!(outcome, ReplanOutcome::Success);
    let solution = solution.unwrap();
    assert_eq!(solution.cost, 7, "unblocked distance is 3, the wall forces a detour through row 2");
    assert_eq!(solution.path.len(), 8);
    for cell in &blocked {
        assert!(!solution
            .path
            .iter()
            .any(|&id| grid.cell(id) == *cell));
    }
}

#[test]
fn anytime_schedule_converges_to_the_optimal_cost() {
    let grid = Grid::new(5, 5);
    let heuristic = ManhattanHeuristic::new(grid.clone(), Cell::new(4, 4));
    let mut planner = Planner::new(grid.clone(), heuristic);
    planner.set_epsilon_schedule(3.0, 1.0, 1.0);
    planner.set_time_params(unbounded_time_params());
    planner.set_start(grid.state_id(Cell::new(0, 0)));
    planner.set_goal(grid.state_id(Cell::new(4, 4)));

    let (outcome, solution) = planner.replan();
    assert_eq!(outcome, ReplanOutcome::Success);
    assert_eq!(solution.unwrap().cost, 8);
    assert_eq!(planner.satisfied_eps(), 1.0);
    assert_eq!(planner.current_epsilon(), 1.0);
}

#[test]
fn tiny_expansion_budget_times_out_without_partial_solutions() {
    let grid = Grid::new(5, 5);
    let heuristic = ManhattanHeuristic::new(grid.clone(), Cell::new(4, 4));
    let mut planner = Planner::new(grid.clone(), heuristic);
    planner.set_time_params(TimeParameters {
        kind: BudgetKind::Expansions,
        bounded: true,
        improve: true,
        max_expansions_init: 1,
        max_expansions: 1,
        ..TimeParameters::default()
    });
    planner.set_start(grid.state_id(Cell::new(0, 0)));
    planner.set_goal(grid.state_id(Cell::new(4, 4)));

    let (outcome, solution) = planner.replan();
    assert_eq!(outcome, ReplanOutcome::TimedOut);
    assert!(solution.is_none());
}

#[test]
fn tiny_expansion_budget_yields_a_partial_solution_when_allowed() {
    let grid = Grid::new(5, 5);
    let heuristic = ManhattanHeuristic::new(grid.clone(), Cell::new(4, 4));
    let mut planner = Planner::new(grid.clone(), heuristic);
    planner.set_allow_partial_solutions(true);
    planner.set_time_params(TimeParameters {
        kind: BudgetKind::Expansions,
        bounded: true,
        improve: true,
        max_expansions_init: 1,
        max_expansions: 1,
        ..TimeParameters::default()
    });
    let start_id = grid.state_id(Cell::new(0, 0));
    planner.set_start(start_id);
    planner.set_goal(grid.state_id(Cell::new(4, 4)));

    let (outcome, solution) = planner.replan();
    assert_eq!(outcome, ReplanOutcome::PartialSuccess);
    let solution = solution.unwrap();
    assert_eq!(solution.path.first(), Some(&start_id));
}

#[test]
fn goal_change_reconciles_to_the_new_goals_optimal_cost() {
    let grid = Grid::new(5, 5);
    let heuristic = ManhattanHeuristic::new(grid.clone(), Cell::new(4, 4));
    let mut planner = Planner::new(grid.clone(), heuristic);
    planner.set_time_params(unbounded_time_params());
    planner.set_start(grid.state_id(Cell::new(0, 0)));
    planner.set_goal(grid.state_id(Cell::new(4, 4)));
    let (outcome, solution) = planner.replan();
    assert_eq!(outcome, ReplanOutcome::Success);
    assert_eq!(solution.unwrap().cost, 8);

    planner.set_goal(grid.state_id(Cell::new(1, 1)));
    let (outcome, solution) = planner.replan();
    assert_eq!(outcome, ReplanOutcome::Success);
    assert_eq!(solution.unwrap().cost, 2);
}

#[test]
fn force_planning_from_scratch_matches_a_fresh_planner() {
    let grid = Grid::new(5, 5);
    let goal = Cell::new(4, 4);
    let start = Cell::new(0, 0);

    let heuristic = ManhattanHeuristic::new(grid.clone(), goal);
    let mut planner = Planner::new(grid.clone(), heuristic);
    planner.set_time_params(unbounded_time_params());
    planner.set_start(grid.state_id(start));
    planner.set_goal(grid.state_id(goal));
    let (_, first) = planner.replan();

    planner.force_planning_from_scratch();
    let (outcome, second) = planner.replan();

    assert_eq!(outcome, ReplanOutcome::Success);
    assert_eq!(first.unwrap().cost, second.unwrap().cost);
}

#[test]
fn restoring_after_a_timeout_still_converges_on_a_second_replan() {
    let grid = Grid::new(5, 5);
    let heuristic = ManhattanHeuristic::new(grid.clone(), Cell::new(4, 4));
    let mut planner = Planner::new(grid.clone(), heuristic);
    planner.set_allow_partial_solutions(true);
    planner.set_time_params(TimeParameters {
        kind: BudgetKind::Expansions,
        bounded: true,
        improve: true,
        max_expansions_init: 5,
        max_expansions: 5,
        ..TimeParameters::default()
    });
    planner.set_start(grid.state_id(Cell::new(0, 0)));
    planner.set_goal(grid.state_id(Cell::new(4, 4)));
    let (outcome, _) = planner.replan();
    assert_eq!(outcome, ReplanOutcome::PartialSuccess);
    assert_eq!(planner.expansion_step(), 6);

    planner.restore_to_step(2);
    assert_eq!(planner.expansion_step(), 3);

    planner.set_time_params(unbounded_time_params());
    let (outcome, solution) = planner.replan();
    assert_eq!(outcome, ReplanOutcome::Success);
    assert_eq!(solution.unwrap().cost, 8);
}

#[test]
fn start_not_set_and_goal_not_set_are_reported_before_searching() {
    let grid = Grid::new(2, 2);
    let heuristic = ManhattanHeuristic::new(grid.clone(), Cell::new(1, 1));
    let mut planner = Planner::new(grid.clone(), heuristic);

    let (outcome, solution) = planner.replan();
    assert_eq!(outcome, ReplanOutcome::StartNotSet);
    assert!(solution.is_none());

    planner.set_start(grid.state_id(Cell::new(0, 0)));
    let (outcome, solution) = planner.replan();
    assert_eq!(outcome, ReplanOutcome::GoalNotSet);
    assert!(solution.is_none());
}

#[test]
fn compute_key_saturates_on_infinite_inputs() {
    assert_eq!(compute_key(INFINITE_COST, 0, 1.0), INFINITE_COST);
    assert_eq!(compute_key(0, INFINITE_COST, 1.0), INFINITE_COST);
    assert_eq!(compute_key(2, 3, 2.0), 8);
}

#[test]
fn unreachable_goal_exhausts_the_open_list() {
    // Wall the goal off completely.
    let blocked = [Cell::new(0, 1), Cell::new(1, 0)];
    let grid = Grid::with_blocked(2, 2, &blocked);
    let heuristic = ManhattanHeuristic::new(grid.clone(), Cell::new(1, 1));
    let mut planner = Planner::new(grid.clone(), heuristic);
    planner.set_time_params(unbounded_time_params());
    planner.set_start(grid.state_id(Cell::new(0, 0)));
    planner.set_goal(grid.state_id(Cell::new(1, 1)));

    let (outcome, solution) = planner.replan();
    assert_eq!(outcome, ReplanOutcome::ExhaustedOpenList);
    assert!(solution.is_none());
}
