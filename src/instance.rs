//! Agents, paths, solutions, and the `Instance` (grid + validated agent
//! table) assembled from a map file and a scenario file.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path as FsPath;

use tracing::warn;

use crate::error::MapfError;
use crate::grid::{Cell, Grid};

/// A single agent: stable id, start cell, goal cell. Agents never carry
/// their path inline — paths live in a `Solution`, keyed by id, so LNS
/// can withdraw and reinsert one agent at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Agent {
    pub id: usize,
    pub start: Cell,
    pub goal: Cell,
}

/// A timed sequence of cells, `p[0] == start`, `p[len-1] == goal`, each
/// consecutive pair a 4-neighbor move or a wait.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path(pub Vec<Cell>);

impl Path {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Position of this path at time `t`, extended by goal parking past
    /// its own length (spec §3's "paths are extended implicitly by their
    /// last cell beyond their own length").
    pub fn at(&self, t: usize) -> Cell {
        *self.0.get(t).unwrap_or_else(|| self.0.last().expect("empty path"))
    }

    /// Sum-of-costs contribution of this path: `length - 1`.
    pub fn cost(&self) -> usize {
        self.len().saturating_sub(1)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let steps: Vec<String> = self
            .0
            .iter()
            .map(|(r, c)| format!("({r},{c})"))
            .collect();
        write!(f, "{}", steps.join(" -> "))
    }
}

/// Mapping from agent id to its current path.
#[derive(Debug, Clone, Default)]
pub struct Solution {
    paths: Vec<Option<Path>>,
}

impl Solution {
    pub fn with_capacity(num_agents: usize) -> Self {
        Solution {
            paths: vec![None; num_agents],
        }
    }

    pub fn get(&self, agent_id: usize) -> Option<&Path> {
        self.paths.get(agent_id).and_then(|p| p.as_ref())
    }

    pub fn set(&mut self, agent_id: usize, path: Path) {
        if agent_id >= self.paths.len() {
            self.paths.resize(agent_id + 1, None);
        }
        self.paths[agent_id] = Some(path);
    }

    pub fn take(&mut self, agent_id: usize) -> Option<Path> {
        self.paths.get_mut(agent_id).and_then(|p| p.take())
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Path)> {
        self.paths
            .iter()
            .enumerate()
            .filter_map(|(id, p)| p.as_ref().map(|p| (id, p)))
    }

    /// Sum over agents of `path length - 1`, per spec §3/§8.
    pub fn cost(&self) -> usize {
        self.iter().map(|(_, p)| p.cost()).sum()
    }

    pub fn num_agents(&self) -> usize {
        self.paths.len()
    }
}

/// Grid + validated agent table, assembled at scenario load.
#[derive(Debug, Clone)]
pub struct Instance {
    pub grid: Grid,
    pub agents: Vec<Agent>,
}

impl Instance {
    /// Parses the tab-separated scenario format (spec §6): a `version 1`
    /// header line, then one line per agent:
    /// `id map W H start_col start_row goal_col goal_row optimal_cost`.
    /// Note the file's column-first convention versus the planner's
    /// `(row, col)` convention.
    ///
    /// Agents whose start or goal lies outside the grid or on a blocked
    /// cell are dropped with a `tracing::warn!` (AgentPlacementError,
    /// spec §7) rather than aborting the load; `agent_limit` caps how
    /// many valid agents are kept (`0` means "all", matching the CLI's
    /// `--agentNum`).
    pub fn load(
        grid: Grid,
        scenario_path: impl AsRef<FsPath>,
        agent_limit: usize,
    ) -> Result<Self, MapfError> {
        let path = scenario_path.as_ref();
        let file = File::open(path).map_err(|e| MapfError::Parse(format!("{}: {e}", path.display())))?;
        let mut lines = BufReader::new(file).lines();

        let header = lines
            .next()
            .ok_or_else(|| MapfError::Parse("empty scenario file".into()))??;
        if !header.trim_start().starts_with("version") {
            return Err(MapfError::Parse(format!(
                "expected 'version' header line, got {header:?}"
            )));
        }

        let mut agents = Vec::new();
        for (raw_id, line) in lines.enumerate() {
            let line = line.map_err(|e| MapfError::Parse(e.to_string()))?;
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 9 {
                return Err(MapfError::Parse(format!(
                    "scenario line {raw_id} has {} fields, expected 9",
                    fields.len()
                )));
            }
            let parse = |s: &str| {
                s.parse::<usize>()
                    .map_err(|_| MapfError::Parse(format!("bad integer field {s:?}")))
            };
            let start_col = parse(fields[4])?;
            let start_row = parse(fields[5])?;
            let goal_col = parse(fields[6])?;
            let goal_row = parse(fields[7])?;

            let agent = Agent {
                id: agents.len(),
                start: (start_row, start_col),
                goal: (goal_row, goal_col),
            };

            if !grid.is_passable(agent.start) {
                warn!(
                    agent = raw_id,
                    start = ?agent.start,
                    "agent placement error: start is out of bounds or blocked, skipping agent"
                );
                continue;
            }
            if !grid.is_passable(agent.goal) {
                warn!(
                    agent = raw_id,
                    goal = ?agent.goal,
                    "agent placement error: goal is out of bounds or blocked, skipping agent"
                );
                continue;
            }

            agents.push(agent);
            if agent_limit != 0 && agents.len() >= agent_limit {
                break;
            }
        }

        // Re-stamp ids densely after any skips so downstream indexing
        // (Solution::with_capacity, etc.) stays contiguous.
        for (idx, agent) in agents.iter_mut().enumerate() {
            agent.id = idx;
        }

        Ok(Instance { grid, agents })
    }
}
