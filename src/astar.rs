//! Space-Time A*: single-agent shortest path over the time-expanded grid,
//! subject to a `ConstraintTable` (spec §4.C).

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::rc::Rc;

use tracing::{debug, instrument};

use crate::constraint_table::ConstraintTable;
use crate::grid::{Cell, Grid};
use crate::instance::Path;

/// Caller-supplied search bounds. Defaults mirror the reference
/// implementation's `max_t=5000, max_expansions=100000` (spec §4.C, §9).
#[derive(Debug, Clone, Copy)]
pub struct SearchBounds {
    pub max_t: usize,
    pub max_expansions: usize,
}

impl Default for SearchBounds {
    fn default() -> Self {
        SearchBounds {
            max_t: 5000,
            max_expansions: 100_000,
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    cell: Cell,
    g: usize,
    f: usize,
}

// Open-list ordering wrapper: min-heap on f, tie-break on larger g
// (spec §4.C: "smaller g first (equivalently larger h)"), then a stable
// secondary key on cell so two nodes with identical f/g never compare
// equal unless they are genuinely the same state.
#[derive(Debug)]
struct OpenOrder(Rc<RefCell<Node>>);

impl PartialEq for OpenOrder {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for OpenOrder {}

impl PartialOrd for OpenOrder {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenOrder {
    fn cmp(&self, other: &Self) -> Ordering {
        let a = self.0.borrow();
        let b = other.0.borrow();
        // BinaryHeap is a max-heap; reverse f so the smallest f pops
        // first, then prefer the larger g (smaller h) on ties, then an
        // arbitrary but stable cell ordering.
        b.f.cmp(&a.f)
            .then_with(|| a.g.cmp(&b.g))
            .then_with(|| b.cell.cmp(&a.cell))
    }
}

fn manhattan(a: Cell, b: Cell) -> usize {
    (a.0 as isize - b.0 as isize).unsigned_abs() + (a.1 as isize - b.1 as isize).unsigned_abs()
}

/// Finds a path from `start` to `goal` on `grid` under `ct`, or returns
/// `None` if none exists within `bounds`. Node = `(cell, t)`; successors
/// are the four cardinal moves plus waiting, filtered by passability and
/// `ct.blocked`. Termination: first pop at `(goal, t)` with
/// `!ct.goal_reserved_after(goal, t)` — i.e. no other agent's permanent
/// parking would later force this agent off the cell.
#[instrument(skip(grid, ct), fields(start = ?start, goal = ?goal))]
pub fn space_time_astar(
    grid: &Grid,
    ct: &ConstraintTable,
    start: Cell,
    goal: Cell,
    bounds: SearchBounds,
) -> Option<Path> {
    if start == goal && !ct.goal_reserved_after(goal, 0) {
        return Some(Path(vec![start]));
    }

    let mut open: BinaryHeap<OpenOrder> = BinaryHeap::new();
    let mut best_g: HashMap<(Cell, usize), usize> = HashMap::new();
    let mut closed: HashSet<(Cell, usize)> = HashSet::new();
    let mut trace: HashMap<(Cell, usize), (Cell, usize)> = HashMap::new();

    let start_node = Rc::new(RefCell::new(Node {
        cell: start,
        g: 0,
        f: manhattan(start, goal),
    }));
    open.push(OpenOrder(start_node));
    best_g.insert((start, 0), 0);

    let mut expansions = 0usize;

    while let Some(OpenOrder(node)) = open.pop() {
        let (cell, g) = {
            let n = node.borrow();
            (n.cell, n.g)
        };
        let t = g;

        if closed.contains(&(cell, t)) {
            continue;
        }
        closed.insert((cell, t));

        expansions += 1;
        if expansions > bounds.max_expansions {
            debug!(expansions, "A* expansion limit reached");
            return None;
        }

        if cell == goal && !ct.goal_reserved_after(goal, t) {
            return Some(reconstruct(&trace, cell, t, start));
        }

        if t > bounds.max_t {
            continue;
        }

        for next in grid.neighbors(cell) {
            let next_t = t + 1;
            if closed.contains(&(next, next_t)) {
                continue;
            }
            if ct.blocked(cell, next, next_t) {
                continue;
            }
            let tentative_g = next_t;
            let better = best_g
                .get(&(next, next_t))
                .map(|&g| tentative_g < g)
                .unwrap_or(true);
            if !better {
                continue;
            }
            best_g.insert((next, next_t), tentative_g);
            trace.insert((next, next_t), (cell, t));

            let node = Rc::new(RefCell::new(Node {
                cell: next,
                g: tentative_g,
                f: tentative_g + manhattan(next, goal),
            }));
            open.push(OpenOrder(node));
        }
    }

    debug!("no path found");
    None
}

fn reconstruct(
    trace: &HashMap<(Cell, usize), (Cell, usize)>,
    goal_cell: Cell,
    goal_t: usize,
    start: Cell,
) -> Path {
    let mut steps = vec![goal_cell];
    let mut current = (goal_cell, goal_t);
    while current.0 != start || current.1 != 0 {
        let prev = trace[&current];
        steps.push(prev.0);
        current = prev;
    }
    steps.reverse();
    Path(steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;

    fn empty_grid(h: usize, w: usize) -> Grid {
        Grid::from_rows(vec![vec![true; w]; h])
    }

    #[test]
    fn straight_line_no_obstacles() {
        let grid = empty_grid(3, 3);
        let ct = ConstraintTable::new();
        let path =
            space_time_astar(&grid, &ct, (0, 0), (0, 2), SearchBounds::default()).unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path.0, vec![(0, 0), (0, 1), (0, 2)]);
    }

    #[test]
    fn start_equals_goal_is_length_one() {
        let grid = empty_grid(3, 3);
        let ct = ConstraintTable::new();
        let path =
            space_time_astar(&grid, &ct, (1, 1), (1, 1), SearchBounds::default()).unwrap();
        assert_eq!(path.0, vec![(1, 1)]);
    }

    #[test]
    fn detour_around_block_has_exact_manhattan_length() {
        let mut rows = vec![vec![true; 5]; 5];
        rows[2][2] = false;
        let grid = Grid::from_rows(rows);
        let ct = ConstraintTable::new();
        let path =
            space_time_astar(&grid, &ct, (0, 0), (4, 4), SearchBounds::default()).unwrap();
        assert_eq!(path.cost(), 8);
    }

    #[test]
    fn waits_out_a_vertex_constraint() {
        let grid = empty_grid(3, 3);
        let mut ct = ConstraintTable::new();
        // Block (0,1) at t=1 so the direct route must wait first.
        ct.insert_path(&Path(vec![(0, 1), (0, 1)]));
        let path =
            space_time_astar(&grid, &ct, (0, 0), (0, 2), SearchBounds::default()).unwrap();
        // Path must still be valid: never land on (0,1) at t=1.
        assert_ne!(path.at(1), (0, 1));
    }

    #[test]
    fn goal_parking_of_another_agent_blocks_forever() {
        let grid = empty_grid(1, 5);
        let mut ct = ConstraintTable::new();
        // Another agent already parks at (0,4) from t=0 onward: no
        // arrival time is ever legal for a second agent.
        ct.insert_path(&Path(vec![(0, 4)]));
        let path = space_time_astar(&grid, &ct, (0, 3), (0, 4), SearchBounds::default());
        assert!(path.is_none());
    }

    #[test]
    fn expansion_limit_returns_none() {
        let grid = empty_grid(50, 50);
        let ct = ConstraintTable::new();
        let bounds = SearchBounds {
            max_t: 5000,
            max_expansions: 1,
        };
        let path = space_time_astar(&grid, &ct, (0, 0), (49, 49), bounds);
        assert!(path.is_none());
    }
}
