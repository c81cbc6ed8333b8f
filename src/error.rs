//! Error type for caller mistakes.
//!
//! Normal non-success outcomes of an optimization (no players, no feasible
//! arrangement, a result that would regress the visible score) are reported
//! as data in [`OptimizeOutcome`](crate::balance::OptimizeOutcome), never
//! through this type.

use thiserror::Error;

use crate::player::PlayerId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BalanceError {
    #[error("team count must be at least 1")]
    ZeroTeams,

    #[error("rating of player {id} is not a finite number: {rating}")]
    NonFiniteRating { id: PlayerId, rating: f64 },

    #[error("rating threshold is not a finite number: {0}")]
    NonFiniteThreshold(f64),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("team index {team} out of range for {team_count} teams")]
    TeamOutOfRange { team: usize, team_count: usize },

    #[error("player index {player} out of range for team {team} of size {size}")]
    PlayerOutOfRange {
        team: usize,
        player: usize,
        size: usize,
    },

    #[error("unknown position code: {0:?}")]
    UnknownPosition(String),

    #[error("no player with id {0}")]
    UnknownPlayer(PlayerId),
}
