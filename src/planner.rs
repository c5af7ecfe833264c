//! Prioritized Planner (spec §4.D): builds an initial collision-free
//! solution by running Space-Time A* one agent at a time, inserting each
//! result into a shared `ConstraintTable` before planning the next.

use tracing::{debug, instrument};

use crate::astar::{space_time_astar, SearchBounds};
use crate::constraint_table::ConstraintTable;
use crate::error::MapfError;
use crate::grid::Grid;
use crate::instance::{Agent, Solution};

/// Plans every agent in `order` (a permutation of `agents`' indices,
/// default id order) against a fresh `ConstraintTable`, inserting each
/// success before moving to the next agent. No backtracking: the first
/// agent A* fails for aborts the whole call with
/// `MapfError::NoInitialSolution` (spec §4.D — infeasibility here is
/// propagated to the caller, not retried with a different order).
#[instrument(skip(grid, agents, order))]
pub fn plan_prioritized(
    grid: &Grid,
    agents: &[Agent],
    order: &[usize],
    bounds: SearchBounds,
) -> Result<(Solution, ConstraintTable), MapfError> {
    let mut ct = ConstraintTable::new();
    let mut solution = Solution::with_capacity(agents.len());

    for &idx in order {
        let agent = &agents[idx];
        match space_time_astar(grid, &ct, agent.start, agent.goal, bounds) {
            Some(path) => {
                ct.insert_path(&path);
                solution.set(agent.id, path);
            }
            None => {
                debug!(agent = agent.id, "prioritized planning failed for agent");
                return Err(MapfError::NoInitialSolution);
            }
        }
    }

    Ok((solution, ct))
}

/// The default agent ordering: plan in ascending id order.
pub fn id_order(agents: &[Agent]) -> Vec<usize> {
    (0..agents.len()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;

    fn empty_grid(h: usize, w: usize) -> Grid {
        Grid::from_rows(vec![vec![true; w]; h])
    }

    #[test]
    fn two_agents_crossing_paths_produce_valid_solution() {
        let grid = empty_grid(3, 3);
        let agents = vec![
            Agent {
                id: 0,
                start: (0, 0),
                goal: (2, 2),
            },
            Agent {
                id: 1,
                start: (2, 0),
                goal: (0, 2),
            },
        ];
        let order = id_order(&agents);
        let (solution, _ct) =
            plan_prioritized(&grid, &agents, &order, SearchBounds::default()).unwrap();

        assert_eq!(solution.get(0).unwrap().len(), 5);
        assert_eq!(solution.get(1).unwrap().len(), 5);

        let p0 = solution.get(0).unwrap();
        let p1 = solution.get(1).unwrap();
        for t in 0..5 {
            assert_ne!(p0.at(t), p1.at(t), "vertex conflict at t={t}");
        }
    }

    #[test]
    fn single_agent_start_equals_goal() {
        let grid = empty_grid(1, 1);
        let agents = vec![Agent {
            id: 0,
            start: (0, 0),
            goal: (0, 0),
        }];
        let order = id_order(&agents);
        let (solution, _ct) =
            plan_prioritized(&grid, &agents, &order, SearchBounds::default()).unwrap();
        assert_eq!(solution.get(0).unwrap().len(), 1);
    }

    #[test]
    fn corridor_swap_requires_a_wait() {
        let grid = empty_grid(1, 5);
        let agents = vec![
            Agent {
                id: 0,
                start: (0, 0),
                goal: (0, 4),
            },
            Agent {
                id: 1,
                start: (0, 4),
                goal: (0, 0),
            },
        ];
        let order = id_order(&agents);
        let (solution, _ct) =
            plan_prioritized(&grid, &agents, &order, SearchBounds::default()).unwrap();
        let total = solution.cost();
        // 4 + 4 direct is impossible (head-on collision in a 1-wide
        // corridor); the valid solution costs at least one extra wait.
        assert!(total >= 9);
    }
}
