//! Pure verifier of vertex and edge conflicts across a set of paths
//! (spec §4.F). Used by tests and to audit solutions produced by
//! external planners; ignores any per-cell orientation metadata.

use crate::grid::Cell;
use crate::instance::Solution;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    Vertex {
        agent_a: usize,
        agent_b: usize,
        time: usize,
        cell: Cell,
    },
    Edge {
        agent_a: usize,
        agent_b: usize,
        time: usize,
        cell_a: Cell,
        cell_b: Cell,
    },
}

/// Checks every pair of agents in `solution` for (V1) vertex and (V2)
/// edge conflicts over the union of their path lengths, extending the
/// shorter path by goal parking (spec §3). Returns every conflict found;
/// an empty vector means the solution is valid.
pub fn check_collisions(solution: &Solution) -> Vec<Conflict> {
    let agents: Vec<(usize, &crate::instance::Path)> = solution.iter().collect();
    let mut conflicts = Vec::new();

    for i in 0..agents.len() {
        for j in (i + 1)..agents.len() {
            let (id_a, path_a) = agents[i];
            let (id_b, path_b) = agents[j];
            let max_len = path_a.len().max(path_b.len());

            for t in 0..max_len {
                let pos_a = path_a.at(t);
                let pos_b = path_b.at(t);
                if pos_a == pos_b {
                    conflicts.push(Conflict::Vertex {
                        agent_a: id_a,
                        agent_b: id_b,
                        time: t,
                        cell: pos_a,
                    });
                }

                if t == 0 {
                    continue;
                }
                let prev_a = path_a.at(t - 1);
                let prev_b = path_b.at(t - 1);
                if prev_a == pos_b && prev_b == pos_a && prev_a != pos_a {
                    conflicts.push(Conflict::Edge {
                        agent_a: id_a,
                        agent_b: id_b,
                        time: t,
                        cell_a: prev_a,
                        cell_b: pos_a,
                    });
                }
            }
        }
    }

    conflicts
}
