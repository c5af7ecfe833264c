//! Typed error kinds for the planner's library surface (spec §7).
//!
//! Library functions (`grid`, `instance`, `constraint_table`, `astar`,
//! `planner`, `lns`, `collision`) return `Result<T, MapfError>` so
//! external collaborators can match on error kind. `main` collapses this
//! into `anyhow::Result<()>` at the CLI boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapfError {
    /// Bad CLI arguments or file paths; fatal, reported before planning begins.
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed map or scenario file; fatal.
    #[error("parse error: {0}")]
    Parse(String),

    /// Prioritized planner returned no path for at least one agent.
    #[error("no initial solution found within the time budget")]
    NoInitialSolution,
}
