//! Non-regression gate between successive optimization calls.
//!
//! The gate holds the score of the last committed result. A new result is
//! committed only if its score is no greater, so the visible score never
//! rises until the caller resets the baseline (typically after editing
//! player data).

use tracing::debug;

/// Advisory shown when a result is held back by the gate.
pub const REGRESSION_MESSAGE: &str = "result not updated; would have increased rating variance";

/// Outcome of presenting a score to the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GateDecision {
    /// The result becomes visible and the new baseline.
    Commit,
    /// The previous result stays visible.
    Reject,
}

impl GateDecision {
    pub fn is_commit(self) -> bool {
        self == GateDecision::Commit
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResultGate {
    baseline: f64,
}

impl Default for ResultGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultGate {
    /// A gate with no baseline: the first result always commits.
    pub fn new() -> Self {
        Self {
            baseline: f64::INFINITY,
        }
    }

    pub fn with_baseline(baseline: f64) -> Self {
        Self { baseline }
    }

    pub fn baseline(&self) -> f64 {
        self.baseline
    }

    pub fn reset(&mut self) {
        self.baseline = f64::INFINITY;
    }

    /// Decides without updating the baseline. Ties commit; NaN never does.
    pub fn decide(&self, score: f64) -> GateDecision {
        if score <= self.baseline {
            GateDecision::Commit
        } else {
            GateDecision::Reject
        }
    }

    /// Decides, and on commit makes `score` the new baseline.
    pub fn admit(&mut self, score: f64) -> GateDecision {
        let decision = self.decide(score);
        debug!(score, baseline = self.baseline, ?decision, "result gate");
        if decision.is_commit() {
            self.baseline = score;
        }
        decision
    }
}
