//! Bookkeeping of forbidden (cell, time) and (edge, time) entries plus
//! goal-parking reservations, consulted by Space-Time A* (spec §4.B).

use std::collections::HashMap;

use crate::grid::Cell;
use crate::instance::Path;

type Edge = (Cell, Cell);

/// Query context for Space-Time A*. Vertex and edge constraints are
/// reference-counted so `withdraw_path` only removes the contribution of
/// the one path being withdrawn, tolerating two paths sharing a
/// `(cell, t)` or `(edge, t)` slot during LNS bookkeeping (spec §4.B).
#[derive(Debug, Clone, Default)]
pub struct ConstraintTable {
    vertex: HashMap<(Cell, usize), u32>,
    edge: HashMap<(Edge, usize), u32>,
    /// Per-cell *minimum* reserved goal-parking time: `goal[cell] = t0`
    /// forbids occupying `cell` at any `t >= t0` on behalf of an agent
    /// that does not itself park there. Multiple paths ending at the
    /// same cell keep the smallest `t0`, so withdrawing the path with
    /// the earliest parking time must recompute the remaining minimum
    /// over the others still present.
    goal: HashMap<Cell, Vec<usize>>,
}

impl ConstraintTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds every vertex/edge occupancy implied by `path`, and updates
    /// the goal reservation for its final cell to the minimum of the
    /// existing value and `path.len() - 1`.
    pub fn insert_path(&mut self, path: &Path) {
        for (t, &cell) in path.0.iter().enumerate() {
            *self.vertex.entry((cell, t)).or_insert(0) += 1;
            if t > 0 {
                let prev = path.0[t - 1];
                *self.edge.entry(((prev, cell), t)).or_insert(0) += 1;
            }
        }
        if let Some(&goal_cell) = path.0.last() {
            self.goal.entry(goal_cell).or_default().push(path.cost());
        }
    }

    /// Symmetric removal of everything `insert_path(path)` added. Safe
    /// to call even if other paths still occupy the same (cell, t) or
    /// (edge, t) slots — only this path's contribution is decremented.
    pub fn withdraw_path(&mut self, path: &Path) {
        for (t, &cell) in path.0.iter().enumerate() {
            decrement(&mut self.vertex, (cell, t));
            if t > 0 {
                let prev = path.0[t - 1];
                decrement(&mut self.edge, ((prev, cell), t));
            }
        }
        if let Some(&goal_cell) = path.0.last() {
            if let Some(times) = self.goal.get_mut(&goal_cell) {
                if let Some(pos) = times.iter().position(|&v| v == path.cost()) {
                    times.swap_remove(pos);
                }
                if times.is_empty() {
                    self.goal.remove(&goal_cell);
                }
            }
        }
    }

    /// True iff moving from `from_cell` to `to_cell`, arriving at
    /// `arrival_t`, is forbidden: the destination is occupied at that
    /// time, the edge is occupied in the opposite direction at that
    /// time, or the destination is permanently parked on by another
    /// agent from `arrival_t` onward.
    pub fn blocked(&self, from_cell: Cell, to_cell: Cell, arrival_t: usize) -> bool {
        if self.vertex.contains_key(&(to_cell, arrival_t)) {
            return true;
        }
        if self.edge.contains_key(&((from_cell, to_cell), arrival_t)) {
            return true;
        }
        self.goal_reserved_after(to_cell, arrival_t)
    }

    /// True iff some agent's goal-parking reservation at `cell` forbids
    /// occupying it from time `t` onward — the exact half-line form
    /// (spec §9: "Implementers should prefer the exact form" over the
    /// original's fixed 20-step lookahead).
    pub fn goal_reserved_after(&self, cell: Cell, t: usize) -> bool {
        self.goal
            .get(&cell)
            .map(|times| times.iter().any(|&t0| t0 <= t))
            .unwrap_or(false)
    }
}

fn decrement<K: std::hash::Hash + Eq>(map: &mut HashMap<K, u32>, key: K) {
    if let Some(count) = map.get_mut(&key) {
        *count -= 1;
        if *count == 0 {
            map.remove(&key);
        }
    }
}
