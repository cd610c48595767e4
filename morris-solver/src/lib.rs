//! Offline score-table generation for three men's morris with FIFO pieces.

pub mod graph;
pub mod solver;
pub mod stats;
pub mod table;

pub use graph::StateGraph;
pub use solver::{verify_table, Solver};
