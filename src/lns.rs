//! Anytime LNS Driver (spec §4.E): owns the session. Builds an initial
//! solution via the Prioritized Planner, then repeatedly destroys a
//! random neighborhood of agents and repairs it via Space-Time A*,
//! keeping the repair only if it strictly lowers sum-of-costs.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info, instrument};

use crate::astar::{space_time_astar, SearchBounds};
use crate::constraint_table::ConstraintTable;
use crate::error::MapfError;
use crate::grid::Grid;
use crate::instance::{Agent, Solution};
use crate::planner::{id_order, plan_prioritized};

/// One row of the per-iteration stats trace (spec §6's CSV header).
#[derive(Debug, Clone)]
pub struct StatsRow {
    pub iteration: usize,
    pub solution_cost: usize,
    pub failed_iterations: usize,
    pub runtime: Duration,
}

/// Configuration knobs for one LNS session (spec §6 CLI surface).
#[derive(Debug, Clone)]
pub struct LnsConfig {
    pub neighbor_size: usize,
    pub max_iterations: usize,
    pub time_limit: Duration,
    pub seed: u64,
    pub bounds: SearchBounds,
}

impl Default for LnsConfig {
    fn default() -> Self {
        LnsConfig {
            neighbor_size: 8,
            max_iterations: usize::MAX,
            time_limit: Duration::from_secs(60),
            seed: 0,
            bounds: SearchBounds::default(),
        }
    }
}

/// Owns the evolving solution, its constraint table, and the session
/// deadline. `run` drives destroy -> withdraw -> repair -> accept/rollback
/// to the termination conditions in spec §4.E.
pub struct Lns<'a> {
    grid: &'a Grid,
    agents: &'a [Agent],
    config: LnsConfig,
    solution: Solution,
    ct: ConstraintTable,
    rng: StdRng,
    iteration: usize,
    failed_iterations: usize,
    stats: Vec<StatsRow>,
}

impl<'a> Lns<'a> {
    /// Builds the initial prioritized-planning solution and returns a
    /// driver ready to run the anytime loop, or
    /// `MapfError::NoInitialSolution` if even the initial plan fails
    /// (spec §7's InitialSolutionFailure).
    #[instrument(skip(grid, agents, config))]
    pub fn new(
        grid: &'a Grid,
        agents: &'a [Agent],
        config: LnsConfig,
    ) -> Result<Self, MapfError> {
        let order = id_order(agents);
        let (solution, ct) = plan_prioritized(grid, agents, &order, config.bounds)?;
        info!(cost = solution.cost(), "initial solution found");

        let rng = StdRng::seed_from_u64(config.seed);
        Ok(Lns {
            grid,
            agents,
            config,
            solution,
            ct,
            rng,
            iteration: 0,
            failed_iterations: 0,
            stats: Vec::new(),
        })
    }

    pub fn solution(&self) -> &Solution {
        &self.solution
    }

    pub fn stats(&self) -> &[StatsRow] {
        &self.stats
    }

    /// Runs the anytime loop until `time_limit` or `max_iterations` is
    /// reached (spec §4.E), returning the best solution observed — which
    /// is always `self.solution`, since every accepted iteration strictly
    /// lowers cost and every rejected one rolls back in full.
    pub fn run(&mut self) -> &Solution {
        let start = Instant::now();
        while start.elapsed() < self.config.time_limit && self.iteration < self.config.max_iterations
        {
            self.iterate(start);
        }
        &self.solution
    }

    /// Runs one destroy/repair/accept-or-rollback cycle and records a
    /// stats row. Public so callers (and tests) can single-step the
    /// anytime loop.
    pub fn iterate(&mut self, session_start: Instant) {
        self.iteration += 1;
        let old_cost = self.solution.cost();

        let neighborhood = self.destroy();
        let old_paths: Vec<_> = neighborhood
            .iter()
            .map(|&id| (id, self.solution.get(id).cloned().unwrap()))
            .collect();

        for (_, path) in &old_paths {
            self.ct.withdraw_path(path);
        }
        for &id in &neighborhood {
            self.solution.take(id);
        }

        // `repair` inserts each new path into self.ct as it succeeds, so
        // later agents in the same neighborhood plan against their
        // already-repaired neighbors.
        let repaired = self.repair(&neighborhood);

        let accept = match &repaired {
            Some(new_paths) => {
                for (id, path) in new_paths {
                    self.solution.set(*id, path.clone());
                }
                self.solution.cost() < old_cost
            }
            None => false,
        };

        if !accept {
            // Roll back: undo whatever the (possibly partial) repair
            // inserted, then restore every withdrawn path, in both the
            // solution and the constraint table (spec's resolved Open
            // Question: restore both, not just one).
            if let Some(new_paths) = &repaired {
                for (id, path) in new_paths {
                    self.ct.withdraw_path(path);
                    self.solution.take(*id);
                }
            }
            for (id, path) in &old_paths {
                self.ct.insert_path(path);
                self.solution.set(*id, path.clone());
            }
            self.failed_iterations += 1;
            debug!(
                iteration = self.iteration,
                "LNS iteration rejected, rolled back"
            );
        }

        self.stats.push(StatsRow {
            iteration: self.iteration,
            solution_cost: self.solution.cost(),
            failed_iterations: self.failed_iterations,
            runtime: session_start.elapsed(),
        });
    }

    /// Uniform-random-without-replacement neighborhood selection (spec
    /// §4.E / §9's "minimum viable policy"), capped at the agent count.
    /// Richer policies (conflict-based, agent-based with relatedness,
    /// random-walk from a seed agent) are valid extensions as long as
    /// the neighborhood stays non-empty and repair order deterministic;
    /// not implemented here.
    fn destroy(&mut self) -> Vec<usize> {
        let size = self.config.neighbor_size.min(self.agents.len());
        let mut ids: Vec<usize> = self.agents.iter().map(|a| a.id).collect();
        let (chosen, _) = ids.partial_shuffle(&mut self.rng, size);
        let mut chosen: Vec<usize> = chosen.to_vec();
        chosen.sort_unstable();
        chosen
    }

    /// Replans each agent in `neighborhood`, in ascending id order,
    /// against the already-shrunk constraint table. Returns `None` (and
    /// leaves `self.ct`/`self.solution` untouched beyond the withdrawal
    /// already performed by the caller) the moment any agent fails.
    fn repair(&mut self, neighborhood: &[usize]) -> Option<Vec<(usize, crate::instance::Path)>> {
        let mut new_paths = Vec::with_capacity(neighborhood.len());
        for &id in neighborhood {
            let agent = self.agents.iter().find(|a| a.id == id).expect("known agent id");
            match space_time_astar(
                self.grid,
                &self.ct,
                agent.start,
                agent.goal,
                self.config.bounds,
            ) {
                Some(path) => {
                    self.ct.insert_path(&path);
                    new_paths.push((id, path));
                }
                None => {
                    // Undo the partial inserts this repair attempt made
                    // so the caller's rollback starts from a clean CT.
                    for (_, path) in &new_paths {
                        self.ct.withdraw_path(path);
                    }
                    return None;
                }
            }
        }
        Some(new_paths)
    }
}
