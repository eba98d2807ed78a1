//! A 4-connected integer grid with unit edge costs, used to exercise the
//! planner core against a concrete graph/heuristic pair (SPEC_FULL.md
//! §10.5) without pulling in a real domain's parsing and modelling layers.

use crate::planner::{Graph, GraphStateId, Heuristic, INFINITE_COST};
use std::io::Write;

/// A point on the grid, in row-major `(row, col)` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// A rectangular grid of a fixed width and height, with a set of blocked
/// cells. Graph-state-ids are `row * width + col`.
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    blocked: Vec<bool>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            blocked: vec![false; width * height],
        }
    }

    pub fn with_blocked(width: usize, height: usize, blocked_cells: &[Cell]) -> Self {
        let mut grid = Self::new(width, height);
        for cell in blocked_cells {
            grid.block(*cell);
        }
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn block(&mut self, cell: Cell) {
        let idx = self.index(cell);
        self.blocked[idx] = true;
    }

    pub fn is_blocked(&self, cell: Cell) -> bool {
        self.blocked[self.index(cell)]
    }

    pub fn state_id(&self, cell: Cell) -> GraphStateId {
        self.index(cell)
    }

    pub fn cell(&self, state_id: GraphStateId) -> Cell {
        Cell::new(state_id / self.width, state_id % self.width)
    }

    fn index(&self, cell: Cell) -> usize {
        cell.row * self.width + cell.col
    }

    fn in_bounds(&self, row: isize, col: isize) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.height && (col as usize) < self.width
    }

    fn neighbours(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        const DELTAS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
        DELTAS.iter().filter_map(move |(dr, dc)| {
            let row = cell.row as isize + dr;
            let col = cell.col as isize + dc;
            if !self.in_bounds(row, col) {
                return None;
            }
            let neighbour = Cell::new(row as usize, col as usize);
            if self.is_blocked(neighbour) {
                return None;
            }
            Some(neighbour)
        })
    }
}

impl Graph for Grid {
    fn get_successors(&self, state_id: GraphStateId) -> Vec<(GraphStateId, u32)> {
        let cell = self.cell(state_id);
        if self.is_blocked(cell) {
            return Vec::new();
        }
        self.neighbours(cell)
            .map(|neighbour| (self.state_id(neighbour), 1))
            .collect()
    }

    fn get_predecessors(&self, state_id: GraphStateId) -> Vec<(GraphStateId, u32)> {
        // The grid's adjacency is symmetric, so predecessors and successors
        // coincide; still unused by the forward search.
        self.get_successors(state_id)
    }

    fn print_state(&self, state_id: GraphStateId, verbose: bool, out: &mut dyn Write) {
        let cell = self.cell(state_id);
        if verbose {
            let _ = writeln!(
                out,
                "state {state_id}: ({}, {}) blocked={}",
                cell.row,
                cell.col,
                self.is_blocked(cell)
            );
        } else {
            let _ = writeln!(out, "({}, {})", cell.row, cell.col);
        }
    }
}

/// Manhattan distance to a fixed goal cell. Admissible and consistent for a
/// 4-connected unit-cost grid, so an `initial_eps = final_eps = 1` search
/// through it returns the optimal cost (SPEC_FULL.md §8's first law).
#[derive(Debug, Clone)]
pub struct ManhattanHeuristic {
    grid: Grid,
    goal: Cell,
}

impl ManhattanHeuristic {
    pub fn new(grid: Grid, goal: Cell) -> Self {
        Self { grid, goal }
    }
}

impl Heuristic for ManhattanHeuristic {
    fn goal_heuristic(&self, state_id: GraphStateId) -> u32 {
        let cell = self.grid.cell(state_id);
        if self.grid.is_blocked(cell) {
            return INFINITE_COST;
        }
        let row_dist = cell.row.abs_diff(self.goal.row);
        let col_dist = cell.col.abs_diff(self.goal.col);
        (row_dist + col_dist) as u32
    }

    fn set_goal(&mut self, goal_id: GraphStateId) {
        self.goal = self.grid.cell(goal_id);
    }
}
