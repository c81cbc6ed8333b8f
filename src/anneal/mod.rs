//! Constrained Simulated Annealing.
//!
//! A single-solution trajectory search. Each iteration proposes one
//! neighbor; infeasible neighbors are discarded unscored, feasible ones
//! are accepted by the Metropolis criterion `exp(-delta / T)`, and the
//! temperature cools geometrically after every iteration.
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Metropolis et al. (1953), "Equation of State Calculations by Fast
//!   Computing Machines"

mod config;
mod runner;
mod types;

pub use config::AnnealConfig;
pub use runner::{AnnealResult, AnnealRunner};
pub use types::AnnealProblem;
