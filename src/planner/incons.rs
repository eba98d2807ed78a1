//! The incons set (C3): states re-improved after being closed in the current
//! iteration, held back for the next iteration's OPEN.

use crate::planner::state::{StateIdx, StatePool};

#[derive(Debug, Default)]
pub struct InconsSet {
    members: Vec<StateIdx>,
}

impl InconsSet {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, idx: StateIdx) {
        self.members.push(idx);
    }

    /// Empties the set, clearing each member's `incons` flag (invariant 3:
    /// a state is in INCONS iff its flag is set) and returning the former
    /// members for the caller to push back into OPEN at the start of the
    /// next iteration.
    pub fn drain(&mut self, pool: &mut StatePool) -> Vec<StateIdx> {
        let members = std::mem::take(&mut self.members);
        for &idx in &members {
            pool.get_mut(idx).incons = false;
        }
        members
    }

    /// Empties the set without re-admitting its members to OPEN, still
    /// clearing their `incons` flags so a later restore doesn't leave a
    /// state falsely marked as sitting in INCONS.
    pub fn clear(&mut self, pool: &mut StatePool) {
        for &idx in &self.members {
            pool.get_mut(idx).incons = false;
        }
        self.members.clear();
    }
}
