//! Annealing execution loop.

use super::config::AnnealConfig;
use super::types::AnnealProblem;
use crate::error::BalanceError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Iterations between two `cost_history` samples.
const HISTORY_INTERVAL: usize = 100;

/// Result of an annealing run.
#[derive(Debug, Clone)]
pub struct AnnealResult<S: Clone> {
    /// The reported solution: the final walked state, or the best feasible
    /// state visited when `track_best` is set.
    pub solution: S,

    /// Cost of `solution`.
    pub cost: f64,

    /// Whether `solution` satisfies the problem's constraints. Can be
    /// `false` only if the initial state was infeasible and no feasible
    /// proposal was ever accepted.
    pub feasible: bool,

    /// Total number of iterations (temperature steps).
    pub iterations: usize,

    /// Temperature when the loop stopped.
    pub final_temperature: f64,

    /// Number of accepted moves (including improvements).
    pub accepted_moves: usize,

    /// Number of strictly improving moves.
    pub improving_moves: usize,

    /// Proposals discarded as infeasible without being scored.
    pub infeasible_proposals: usize,

    /// Iterations where no move could be proposed.
    pub skipped_proposals: usize,

    /// Whether cancelled externally.
    pub cancelled: bool,

    /// Current cost sampled at regular intervals.
    pub cost_history: Vec<f64>,
}

/// Executes the annealing search.
pub struct AnnealRunner;

impl AnnealRunner {
    /// Runs the search from `initial` with an RNG built from `config.seed`
    /// (or from entropy if unset).
    pub fn run_seeded<P: AnnealProblem>(
        problem: &P,
        config: &AnnealConfig,
        initial: P::Solution,
    ) -> Result<AnnealResult<P::Solution>, BalanceError> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };
        Self::run(problem, config, initial, &mut rng)
    }

    /// Runs the search from `initial`, drawing all randomness from `rng`.
    pub fn run<P: AnnealProblem, R: Rng>(
        problem: &P,
        config: &AnnealConfig,
        initial: P::Solution,
        rng: &mut R,
    ) -> Result<AnnealResult<P::Solution>, BalanceError> {
        Self::run_with_cancel(problem, config, initial, rng, None)
    }

    /// Runs the search with an optional cancellation token, checked once
    /// per iteration.
    pub fn run_with_cancel<P: AnnealProblem, R: Rng>(
        problem: &P,
        config: &AnnealConfig,
        initial: P::Solution,
        rng: &mut R,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<AnnealResult<P::Solution>, BalanceError> {
        config.validate()?;

        let mut current_cost = problem.cost(&initial);
        let mut current_feasible = problem.is_feasible(&initial);
        let mut current = initial;

        // Only consulted when `track_best` is set.
        let mut best = current.clone();
        let mut best_cost = current_cost;
        let mut best_feasible = current_feasible;

        let mut temperature = config.initial_temperature;
        let mut iterations = 0usize;
        let mut accepted_moves = 0usize;
        let mut improving_moves = 0usize;
        let mut infeasible_proposals = 0usize;
        let mut skipped_proposals = 0usize;
        let mut cancelled = false;

        let mut cost_history = vec![current_cost];

        debug!(
            initial_cost = current_cost,
            initial_feasible = current_feasible,
            temperature,
            cooling_rate = config.cooling_rate,
            "annealing started"
        );

        while temperature > config.min_temperature {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    break;
                }
            }
            if config.max_iterations > 0 && iterations >= config.max_iterations {
                break;
            }

            match problem.propose(&current, rng) {
                None => skipped_proposals += 1,
                Some(candidate) if !problem.is_feasible(&candidate) => {
                    infeasible_proposals += 1;
                }
                Some(candidate) => {
                    let candidate_cost = problem.cost(&candidate);
                    let delta = candidate_cost - current_cost;

                    // Metropolis acceptance criterion
                    let accept = if delta < 0.0 {
                        improving_moves += 1;
                        true
                    } else {
                        let probability = (-delta / temperature).exp();
                        probability > rng.random::<f64>()
                    };

                    if accept {
                        trace!(iteration = iterations, delta, temperature, "move accepted");
                        current = candidate;
                        current_cost = candidate_cost;
                        current_feasible = true;
                        accepted_moves += 1;

                        if config.track_best && (!best_feasible || current_cost < best_cost) {
                            best = current.clone();
                            best_cost = current_cost;
                            best_feasible = true;
                        }
                    }
                }
            }

            iterations += 1;
            if iterations % HISTORY_INTERVAL == 0 {
                cost_history.push(current_cost);
            }

            temperature *= config.cooling_rate;
        }

        let (solution, cost, feasible) = if config.track_best {
            (best, best_cost, best_feasible)
        } else {
            (current, current_cost, current_feasible)
        };

        if cost_history
            .last()
            .is_none_or(|&last| (last - current_cost).abs() > 1e-15)
        {
            cost_history.push(current_cost);
        }

        debug!(
            iterations,
            accepted_moves,
            improving_moves,
            infeasible_proposals,
            skipped_proposals,
            cost,
            feasible,
            cancelled,
            "annealing finished"
        );

        Ok(AnnealResult {
            solution,
            cost,
            feasible,
            iterations,
            final_temperature: temperature,
            accepted_moves,
            improving_moves,
            infeasible_proposals,
            skipped_proposals,
            cancelled,
            cost_history,
        })
    }
}
