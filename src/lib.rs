//! Anytime Multi-Agent Path Finding: Space-Time A* plus Prioritized
//! Planning + Large Neighborhood Search on a 4-connected grid.
//!
//! This crate is a library first — `grid`, `instance`,
//! `constraint_table`, `astar`, `planner`, `lns`, and `collision` form
//! the core the binary (and any external caller) drives. `config`,
//! `error`, and `stat` are the ambient CLI/reporting layer.

pub mod astar;
pub mod collision;
pub mod config;
pub mod constraint_table;
pub mod error;
pub mod grid;
pub mod instance;
pub mod lns;
pub mod planner;
pub mod stat;
