//! Constrained team balancing by simulated annealing.
//!
//! Splits a roster of rated players into a fixed number of teams so that
//! team average ratings are as close as possible, while every team keeps
//! positional cover and high-rated players are spread evenly.
//!
//! - **player**: player records, positions and their roster codes.
//! - **partition**: teams, partitions, the random initial split and the
//!   player swap move.
//! - **feasibility**: the positional-cover and high-rated-spread rules.
//! - **score**: team averages and their population variance (the objective).
//! - **anneal**: a generic constrained Simulated Annealing runner with
//!   geometric cooling and Metropolis acceptance.
//! - **gate**: keeps the visible score from rising across calls.
//! - **balance**: the [`optimize`](balance::optimize) entry point and the
//!   optional multi-start search (parallel with the `parallel` feature).
//! - **session**: caller-owned state between optimization calls.
//!
//! # Architecture
//!
//! The crate holds no state across calls. Randomness is always injected
//! (`&mut impl Rng`) or derived from an explicit seed, so every result is
//! reproducible in tests. Presentation concerns (tables, forms, display
//! formatting) belong to the caller.

pub mod anneal;
pub mod balance;
pub mod error;
pub mod feasibility;
pub mod gate;
pub mod partition;
pub mod player;
pub mod score;
pub mod session;

pub use balance::{optimize, BalanceConfig, OptimizeOutcome};
pub use error::BalanceError;
pub use partition::{Partition, Team};
pub use player::{Player, PlayerId, Position};
pub use session::BalanceSession;
