use clap::Parser;
use std::time::Duration;
use tra_planner::grid::{Cell, Grid, ManhattanHeuristic};
use tra_planner::planner::{BudgetKind, Planner, ReplanOutcome, TimeParameters};
use tra_planner::verbosity::Verbosity;
use tracing::info;

fn parse_cell(s: &str) -> Result<Cell, String> {
    let (row, col) = s
        .split_once(',')
        .ok_or_else(|| format!("expected ROW,COL, got {s:?}"))?;
    let row = row
        .trim()
        .parse()
        .map_err(|_| format!("invalid row in {s:?}"))?;
    let col = col
        .trim()
        .parse()
        .map_err(|_| format!("invalid col in {s:?}"))?;
    Ok(Cell::new(row, col))
}

#[derive(Parser)]
#[command(version, about = "Anytime heuristic grid search with tree-restoring replanning")]
struct Args {
    #[arg(long, help = "Grid width", default_value_t = 5)]
    width: usize,
    #[arg(long, help = "Grid height", default_value_t = 5)]
    height: usize,
    #[arg(long, help = "Start cell as ROW,COL", value_parser = parse_cell, default_value = "0,0")]
    start: Cell,
    #[arg(long, help = "Goal cell as ROW,COL", value_parser = parse_cell, default_value = "4,4")]
    goal: Cell,
    #[arg(
        long = "block",
        help = "A blocked cell as ROW,COL; may be repeated",
        value_parser = parse_cell
    )]
    blocked: Vec<Cell>,
    #[arg(long, help = "Starting inflation factor", default_value_t = 1.0)]
    initial_eps: f64,
    #[arg(long, help = "Inflation factor to converge to", default_value_t = 1.0)]
    final_eps: f64,
    #[arg(long, help = "Epsilon decrease per iteration", default_value_t = 1.0)]
    delta_eps: f64,
    #[arg(
        long,
        help = "Wall-clock budget for the whole replan call, supports syntax like 30s",
        value_parser = humantime::parse_duration
    )]
    time_limit: Option<Duration>,
    #[arg(long, help = "Expansion-count budget for the whole replan call")]
    max_expansions: Option<u64>,
    #[arg(long, help = "Stop at the first solution instead of improving it")]
    first_solution_only: bool,
    #[arg(
        long,
        help = "If the budget runs out before any solution is found, extract a path to the current best frontier state anyway"
    )]
    allow_partial_solutions: bool,
    #[arg(
        value_enum,
        long,
        help = "Verbosity level",
        default_value_t = Verbosity::Normal
    )]
    verbosity: Verbosity,
}

impl Args {
    fn time_params(&self) -> TimeParameters {
        let improve = !self.first_solution_only;
        if let Some(max_expansions) = self.max_expansions {
            return TimeParameters {
                kind: BudgetKind::Expansions,
                bounded: true,
                improve,
                max_expansions_init: max_expansions,
                max_expansions,
                ..TimeParameters::default()
            };
        }
        if let Some(time_limit) = self.time_limit {
            return TimeParameters {
                kind: BudgetKind::Time,
                bounded: true,
                improve,
                max_allowed_time_init: time_limit,
                max_allowed_time: time_limit,
                ..TimeParameters::default()
            };
        }
        TimeParameters {
            bounded: false,
            improve,
            ..TimeParameters::default()
        }
    }
}

fn main() {
    let args = Args::parse();

    let level: tracing::Level = args.verbosity.into();
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let grid = Grid::with_blocked(args.width, args.height, &args.blocked);
    let heuristic = ManhattanHeuristic::new(grid.clone(), args.goal);
    let mut planner = Planner::new(grid.clone(), heuristic);

    planner.set_epsilon_schedule(args.initial_eps, args.final_eps, args.delta_eps);
    planner.set_search_mode(args.first_solution_only);
    planner.set_allow_partial_solutions(args.allow_partial_solutions);
    planner.set_time_params(args.time_params());

    planner.set_start(grid.state_id(args.start));
    planner.set_goal(grid.state_id(args.goal));

    let (outcome, solution) = planner.replan();
    match outcome {
        ReplanOutcome::Success | ReplanOutcome::PartialSuccess => {
            let solution = solution.expect("a successful outcome carries a solution");
            info!(?outcome, cost = solution.cost, steps = solution.path.len());
            println!("{outcome:?}: cost = {}", solution.cost);
            for state_id in &solution.path {
                let cell = grid.cell(*state_id);
                println!("  ({}, {})", cell.row, cell.col);
            }
        }
        other => {
            println!("No plan found: {other:?}");
        }
    }
}
