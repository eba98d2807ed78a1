//! The open heap (C2): a min-heap over search-states ordered by `f`, ties
//! broken by creation order, with membership testing and decrease-key.

use crate::planner::state::{StateIdx, StatePool};
use priority_queue::PriorityQueue;
use std::cmp::Reverse;
use std::collections::hash_map::RandomState;

/// `(f, created_step)` ascending — [`Reverse`] turns the max-heap
/// [`PriorityQueue`] into the min-heap the spec calls for, and tupling in the
/// creation step gives ties a stable, insertion-order resolution without a
/// separate sequence counter.
type Key = Reverse<(u32, u64)>;

#[derive(Debug, Default)]
pub struct OpenHeap {
    heap: PriorityQueue<StateIdx, Key, RandomState>,
}

impl OpenHeap {
    #[cfg(test)]
    pub fn new() -> Self {
        Self {
            heap: PriorityQueue::new(),
        }
    }

    fn key_of(pool: &StatePool, idx: StateIdx) -> Key {
        let state = pool.get(idx);
        Reverse((state.f, state.created_step))
    }

    pub fn push(&mut self, pool: &StatePool, idx: StateIdx) {
        self.heap.push(idx, Self::key_of(pool, idx));
    }

    /// Lowers (or raises) the key of an already-present state to its current
    /// `f`. Cheaper than remove+push when the state stays in the heap.
    pub fn decrease_key(&mut self, pool: &StatePool, idx: StateIdx) {
        self.heap.change_priority(&idx, Self::key_of(pool, idx));
    }

    pub fn contains(&self, idx: StateIdx) -> bool {
        self.heap.get(&idx).is_some()
    }

    pub fn peek_min(&self) -> Option<StateIdx> {
        self.heap.peek().map(|(&idx, _)| idx)
    }

    pub fn pop_min(&mut self) -> Option<StateIdx> {
        self.heap.pop().map(|(idx, _)| idx)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = StateIdx> + '_ {
        self.heap.iter().map(|(&idx, _)| idx)
    }

    /// Re-heapifies the whole structure against the states' current `f`
    /// values. Used after an epsilon change or a heuristic change mutates
    /// every key at once — rebuilding from scratch is simpler and no less
    /// correct than patching each entry in place.
    pub fn reheapify_all(&mut self, pool: &StatePool) {
        let members: Vec<StateIdx> = self.iter().collect();
        self.heap.clear();
        for idx in members {
            self.heap.push(idx, Self::key_of(pool, idx));
        }
    }
}
