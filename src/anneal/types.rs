//! Core trait for the annealing search.

use rand::Rng;

/// Defines a constrained annealing problem.
///
/// The implementor proposes moves, judges feasibility and scores states.
/// The runner handles temperature, the Metropolis criterion and cooling.
///
/// Infeasible proposals are dropped before scoring: [`cost`](Self::cost)
/// is only called on states for which [`is_feasible`](Self::is_feasible)
/// returned `true`, plus the initial state.
///
/// # Minimization
///
/// The runner minimizes cost. For maximization, negate the cost.
pub trait AnnealProblem: Send + Sync {
    /// The solution representation type.
    type Solution: Clone + Send;

    /// Proposes a neighbor of `current`, or `None` if no move is possible
    /// from the sampled location (the iteration is then skipped).
    fn propose<R: Rng>(&self, current: &Self::Solution, rng: &mut R) -> Option<Self::Solution>;

    /// Whether the solution satisfies every hard constraint.
    fn is_feasible(&self, solution: &Self::Solution) -> bool;

    /// Computes the cost of a solution. Lower is better.
    fn cost(&self, solution: &Self::Solution) -> f64;
}
