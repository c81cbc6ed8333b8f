//! Annealing configuration and the geometric cooling schedule.

use crate::error::BalanceError;

/// Configuration for the annealing search.
///
/// One neighbor is proposed per temperature step. Temperature falls
/// geometrically, `T_{k+1} = cooling_rate * T_k`, and the search stops once
/// `T <= min_temperature`, so the iteration count depends only on these
/// three values.
///
/// # Examples
///
/// ```
/// use u_teambalance::anneal::AnnealConfig;
///
/// let config = AnnealConfig::default()
///     .with_initial_temperature(100.0)
///     .with_cooling_rate(0.995)
///     .with_min_temperature(1.0)
///     .with_seed(42);
/// assert_eq!(config.expected_iterations(), 919);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnealConfig {
    /// Starting temperature. Higher values accept more uphill moves early on.
    pub initial_temperature: f64,

    /// Multiplicative cooling factor in (0, 1). Higher = slower cooling.
    pub cooling_rate: f64,

    /// The search stops when the temperature drops to or below this value.
    pub min_temperature: f64,

    /// Hard iteration budget. 0 = no limit beyond the cooling schedule.
    pub max_iterations: usize,

    /// Report the best feasible state visited instead of the final walked
    /// state. Off by default: the walked state is what gets reported.
    pub track_best: bool,

    /// Random seed used by the seeded entry points.
    pub seed: Option<u64>,
}

impl Default for AnnealConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 100.0,
            cooling_rate: 0.995,
            min_temperature: 1.0,
            max_iterations: 0,
            track_best: false,
            seed: None,
        }
    }
}

impl AnnealConfig {
    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.initial_temperature = t;
        self
    }

    pub fn with_cooling_rate(mut self, rate: f64) -> Self {
        self.cooling_rate = rate;
        self
    }

    pub fn with_min_temperature(mut self, t: f64) -> Self {
        self.min_temperature = t;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_track_best(mut self, track: bool) -> Self {
        self.track_best = track;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), BalanceError> {
        if !(self.initial_temperature > 0.0) || !self.initial_temperature.is_finite() {
            return Err(BalanceError::InvalidConfig(
                "initial_temperature must be positive and finite".into(),
            ));
        }
        if !(self.min_temperature > 0.0) {
            return Err(BalanceError::InvalidConfig(
                "min_temperature must be positive".into(),
            ));
        }
        if self.min_temperature >= self.initial_temperature {
            return Err(BalanceError::InvalidConfig(
                "min_temperature must be less than initial_temperature".into(),
            ));
        }
        if !(self.cooling_rate > 0.0 && self.cooling_rate < 1.0) {
            return Err(BalanceError::InvalidConfig(format!(
                "cooling_rate must be in (0, 1), got {}",
                self.cooling_rate
            )));
        }
        Ok(())
    }

    /// Number of iterations the cooling schedule runs for, ignoring
    /// `max_iterations` and cancellation.
    pub fn expected_iterations(&self) -> usize {
        let mut temperature = self.initial_temperature;
        let mut steps = 0usize;
        while temperature > self.min_temperature {
            temperature *= self.cooling_rate;
            steps += 1;
        }
        steps
    }
}
