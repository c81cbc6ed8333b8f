//! Caller-owned balancing state.
//!
//! [`BalanceSession`] bundles what a front end keeps between button
//! presses: the roster, the team count, the partition currently on
//! display, the gate baseline, and a one-level snapshot of ratings for
//! undoing [`neutralize_ratings`](BalanceSession::neutralize_ratings).
//! Every edit to the roster resets the baseline, since the old score no
//! longer describes the new data.

use rand::Rng;
use tracing::debug;

use crate::balance::{self, BalanceConfig, OptimizeOutcome};
use crate::error::BalanceError;
use crate::gate::ResultGate;
use crate::partition::Partition;
use crate::player::{validate_ratings, Player, PlayerId, Position};

#[derive(Debug, Clone)]
pub struct BalanceSession {
    players: Vec<Player>,
    team_count: usize,
    visible: Option<(Partition, f64)>,
    gate: ResultGate,
    rating_snapshot: Option<Vec<(PlayerId, f64)>>,
}

impl BalanceSession {
    pub fn new(players: Vec<Player>, team_count: usize) -> Result<Self, BalanceError> {
        if team_count == 0 {
            return Err(BalanceError::ZeroTeams);
        }
        validate_ratings(&players)?;
        Ok(Self {
            players,
            team_count,
            visible: None,
            gate: ResultGate::new(),
            rating_snapshot: None,
        })
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn team_count(&self) -> usize {
        self.team_count
    }

    /// The partition currently on display, if any result was committed.
    pub fn partition(&self) -> Option<&Partition> {
        self.visible.as_ref().map(|(p, _)| p)
    }

    /// Score of the partition on display.
    pub fn score(&self) -> Option<f64> {
        self.visible.as_ref().map(|&(_, s)| s)
    }

    pub fn baseline(&self) -> f64 {
        self.gate.baseline()
    }

    pub fn can_undo_neutralize(&self) -> bool {
        self.rating_snapshot.is_some()
    }

    /// Runs [`balance::optimize`] against the session baseline and puts the
    /// result on display only if it was accepted.
    pub fn optimize<R: Rng>(
        &mut self,
        config: &BalanceConfig,
        rng: &mut R,
    ) -> Result<OptimizeOutcome, BalanceError> {
        let outcome = balance::optimize(
            &self.players,
            self.team_count,
            self.gate.baseline(),
            config,
            rng,
        )?;
        if outcome.accepted && self.gate.admit(outcome.score).is_commit() {
            self.visible = Some((outcome.partition.clone(), outcome.score));
        }
        Ok(outcome)
    }

    pub fn reset_baseline(&mut self) {
        self.gate.reset();
    }

    /// Replaces the roster. Drops any pending undo snapshot.
    pub fn set_players(&mut self, players: Vec<Player>) -> Result<(), BalanceError> {
        validate_ratings(&players)?;
        self.players = players;
        self.rating_snapshot = None;
        self.gate.reset();
        Ok(())
    }

    pub fn set_team_count(&mut self, team_count: usize) -> Result<(), BalanceError> {
        if team_count == 0 {
            return Err(BalanceError::ZeroTeams);
        }
        self.team_count = team_count;
        self.gate.reset();
        Ok(())
    }

    /// Sets one player's rating. Drops any pending undo snapshot so a
    /// later [`undo_neutralize`](Self::undo_neutralize) cannot overwrite
    /// this edit.
    pub fn set_rating(&mut self, id: PlayerId, rating: f64) -> Result<(), BalanceError> {
        if !rating.is_finite() {
            return Err(BalanceError::NonFiniteRating { id, rating });
        }
        self.player_mut(id)?.rating = rating;
        self.rating_snapshot = None;
        self.gate.reset();
        Ok(())
    }

    pub fn set_position(&mut self, id: PlayerId, position: Position) -> Result<(), BalanceError> {
        self.player_mut(id)?.position = position;
        self.gate.reset();
        Ok(())
    }

    /// Gives every player the same rating so teams are balanced by
    /// position alone. The previous ratings can be restored once with
    /// [`undo_neutralize`](Self::undo_neutralize).
    pub fn neutralize_ratings(&mut self, rating: f64) -> Result<(), BalanceError> {
        if !rating.is_finite() {
            return Err(BalanceError::InvalidConfig(format!(
                "neutral rating must be finite, got {rating}"
            )));
        }
        self.rating_snapshot = Some(self.players.iter().map(|p| (p.id, p.rating)).collect());
        for p in &mut self.players {
            p.rating = rating;
        }
        self.gate.reset();
        debug!(rating, players = self.players.len(), "ratings neutralized");
        Ok(())
    }

    /// Restores the ratings saved by the last
    /// [`neutralize_ratings`](Self::neutralize_ratings). Players added
    /// since then keep their current rating. Returns `false` if there was
    /// nothing to undo.
    pub fn undo_neutralize(&mut self) -> bool {
        let Some(snapshot) = self.rating_snapshot.take() else {
            return false;
        };
        for (id, rating) in snapshot {
            if let Some(p) = self.players.iter_mut().find(|p| p.id == id) {
                p.rating = rating;
            }
        }
        self.gate.reset();
        true
    }

    fn player_mut(&mut self, id: PlayerId) -> Result<&mut Player, BalanceError> {
        self.players
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(BalanceError::UnknownPlayer(id))
    }
}
