//! Objective: population variance of team average ratings.

use crate::partition::{Partition, Team};

/// Arithmetic mean of the team's ratings, or 0 for an empty team.
pub fn team_average(team: &Team) -> f64 {
    if team.is_empty() {
        return 0.0;
    }
    team.iter().map(|p| p.rating).sum::<f64>() / team.len() as f64
}

pub fn team_averages(partition: &Partition) -> Vec<f64> {
    partition.teams().iter().map(team_average).collect()
}

/// Population variance (divides by the number of teams) of the team
/// averages. Lower is better; 0 means every team has the same average.
///
/// A partition with no teams scores 0.
pub fn partition_variance(partition: &Partition) -> f64 {
    let averages = team_averages(partition);
    if averages.is_empty() {
        return 0.0;
    }
    let k = averages.len() as f64;
    let mean = averages.iter().sum::<f64>() / k;
    averages.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / k
}
