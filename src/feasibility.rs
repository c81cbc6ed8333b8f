//! Feasibility rules for a partition.
//!
//! Two independent checks must both hold:
//!
//! - **Positional cover** (per team): at least one Goalkeeper or Defender,
//!   or at least two Everything players. An empty team has neither.
//! - **High-rated spread** (across teams): the number of players rated at or
//!   above the threshold differs by at most one between any two teams.

use crate::partition::{Partition, Team};
use crate::player::Position;

/// Default rating at or above which a player counts as high-rated.
pub const DEFAULT_RATING_THRESHOLD: f64 = 8.0;

/// Minimum number of `Everything` players that stands in for backbone cover.
pub const MIN_FLEXIBLE_COVER: usize = 2;

/// Largest allowed difference in high-rated counts between teams.
pub const MAX_HIGH_RATED_SPREAD: usize = 1;

pub fn is_team_feasible(team: &Team) -> bool {
    if team.iter().any(|p| p.position.is_backbone()) {
        return true;
    }
    team.iter()
        .filter(|p| p.position == Position::Everything)
        .count()
        >= MIN_FLEXIBLE_COVER
}

/// Number of high-rated players in each team.
pub fn high_rated_counts(partition: &Partition, rating_threshold: f64) -> Vec<usize> {
    partition
        .teams()
        .iter()
        .map(|t| t.iter().filter(|p| p.is_high_rated(rating_threshold)).count())
        .collect()
}

/// `true` if `max(counts) - min(counts) <= 1`. Vacuously true with no teams.
pub fn is_spread_balanced(partition: &Partition, rating_threshold: f64) -> bool {
    counts_within_spread(&high_rated_counts(partition, rating_threshold))
}

pub(crate) fn counts_within_spread(counts: &[usize]) -> bool {
    match (counts.iter().max(), counts.iter().min()) {
        (Some(max), Some(min)) => max - min <= MAX_HIGH_RATED_SPREAD,
        _ => true,
    }
}

/// Every team has positional cover and high-rated players are spread.
pub fn is_feasible(partition: &Partition, rating_threshold: f64) -> bool {
    partition.teams().iter().all(is_team_feasible)
        && is_spread_balanced(partition, rating_threshold)
}
