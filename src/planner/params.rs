//! Budget and epsilon-schedule configuration, and the planner's return
//! codes.
//!
//! The source returns the bitwise-not of these codes on every path (success
//! included) as a C idiom for "nonzero means something to look at"; this
//! rewrite returns [`ReplanOutcome`] directly (see SPEC_FULL.md §9).

use std::time::Duration;

/// What kind of budget bounds a `replan` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetKind {
    Time,
    Expansions,
}

/// The primitive budget/mode form that the anytime loop consumes directly.
/// `_init` limits apply until the first solution of the call is found;
/// the non-init limits apply to every iteration after that.
#[derive(Debug, Clone, Copy)]
pub struct TimeParameters {
    pub kind: BudgetKind,
    /// Whether a budget is enforced at all. `false` means search to
    /// exhaustion or to `final_eps`, whichever comes first.
    pub bounded: bool,
    /// Whether to keep iterating after the first solution, draining INCONS
    /// and lowering epsilon, or stop at the first success.
    pub improve: bool,
    pub max_expansions_init: u64,
    pub max_expansions: u64,
    pub max_allowed_time_init: Duration,
    pub max_allowed_time: Duration,
}

impl Default for TimeParameters {
    fn default() -> Self {
        Self {
            kind: BudgetKind::Time,
            bounded: true,
            improve: true,
            max_expansions_init: 0,
            max_expansions: 0,
            max_allowed_time_init: Duration::ZERO,
            max_allowed_time: Duration::ZERO,
        }
    }
}

/// The convenience parameter object exposed to callers who don't want to
/// think in terms of [`TimeParameters`]' init/non-init split.
#[derive(Debug, Clone, Copy)]
pub struct ReplanParams {
    pub max_time: Duration,
    /// Budget for iterations after the first solution. `None` (or a
    /// non-positive duration, matching the source's `repair_time <= 0.0`
    /// sentinel) means "use `max_time` for those too".
    pub repair_time: Option<Duration>,
    pub initial_eps: f64,
    pub final_eps: f64,
    pub dec_eps: f64,
    pub return_first_solution: bool,
}

impl ReplanParams {
    pub fn to_time_parameters(self) -> TimeParameters {
        let bounded = !self.return_first_solution;
        TimeParameters {
            kind: BudgetKind::Time,
            bounded,
            improve: bounded,
            max_expansions_init: 0,
            max_expansions: 0,
            max_allowed_time_init: self.max_time,
            max_allowed_time: match self.repair_time {
                Some(d) if !d.is_zero() => d,
                _ => self.max_time,
            },
        }
    }
}

/// The planner's return codes (§6, §7 of SPEC_FULL.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplanOutcome {
    Success,
    PartialSuccess,
    StartNotSet,
    GoalNotSet,
    TimedOut,
    ExhaustedOpenList,
}

/// A path and its cost, extracted from the goal (or, for a partial result,
/// from the current best frontier state) back to the start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub path: Vec<crate::planner::state::GraphStateId>,
    pub cost: u32,
}
