//! Teams, partitions and the initial random split.
//!
//! A [`Partition`] always covers its input players exactly once. The only
//! mutation it offers is [`Partition::swap_players`], which exchanges one
//! player between two teams and therefore keeps every team size fixed.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::BalanceError;
use crate::player::{Player, PlayerId};
use crate::score;

/// A group of players playing together.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Team {
    players: Vec<Player>,
}

impl Team {
    pub fn new(players: Vec<Player>) -> Self {
        Self { players }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Mean rating; 0 for an empty team.
    pub fn average_rating(&self) -> f64 {
        score::team_average(self)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Player> {
        self.players.iter()
    }
}

impl<'a> IntoIterator for &'a Team {
    type Item = &'a Player;
    type IntoIter = std::slice::Iter<'a, Player>;

    fn into_iter(self) -> Self::IntoIter {
        self.players.iter()
    }
}

/// An ordered sequence of disjoint teams covering every input player.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Partition {
    teams: Vec<Team>,
}

impl Partition {
    pub fn new(teams: Vec<Team>) -> Self {
        Self { teams }
    }

    /// `team_count` teams with no players.
    pub fn empty(team_count: usize) -> Self {
        Self {
            teams: vec![Team::default(); team_count],
        }
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn into_teams(self) -> Vec<Team> {
        self.teams
    }

    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    pub fn player_count(&self) -> usize {
        self.teams.iter().map(Team::len).sum()
    }

    pub fn sizes(&self) -> Vec<usize> {
        self.teams.iter().map(Team::len).collect()
    }

    pub fn team_averages(&self) -> Vec<f64> {
        score::team_averages(self)
    }

    /// Sorted ids of every player in the partition, duplicates included.
    pub fn player_ids(&self) -> Vec<PlayerId> {
        let mut ids: Vec<PlayerId> = self
            .teams
            .iter()
            .flat_map(|t| t.iter().map(|p| p.id))
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Index of the team holding `id`, if any.
    pub fn team_of(&self, id: PlayerId) -> Option<usize> {
        self.teams
            .iter()
            .position(|t| t.iter().any(|p| p.id == id))
    }

    /// Exchanges `teams[team_a][player_a]` with `teams[team_b][player_b]`.
    ///
    /// Swapping within a single team only reorders that team.
    pub fn swap_players(
        &mut self,
        team_a: usize,
        player_a: usize,
        team_b: usize,
        player_b: usize,
    ) -> Result<(), BalanceError> {
        self.check_index(team_a, player_a)?;
        self.check_index(team_b, player_b)?;

        if team_a == team_b {
            self.teams[team_a].players.swap(player_a, player_b);
            return Ok(());
        }

        let ((lo, p_lo), (hi, p_hi)) = if team_a < team_b {
            ((team_a, player_a), (team_b, player_b))
        } else {
            ((team_b, player_b), (team_a, player_a))
        };
        let (left, right) = self.teams.split_at_mut(hi);
        std::mem::swap(&mut left[lo].players[p_lo], &mut right[0].players[p_hi]);
        Ok(())
    }

    fn check_index(&self, team: usize, player: usize) -> Result<(), BalanceError> {
        let t = self.teams.get(team).ok_or(BalanceError::TeamOutOfRange {
            team,
            team_count: self.teams.len(),
        })?;
        if player >= t.len() {
            return Err(BalanceError::PlayerOutOfRange {
                team,
                player,
                size: t.len(),
            });
        }
        Ok(())
    }
}

/// Returns a copy of `partition` with two players exchanged.
pub fn swap(
    partition: &Partition,
    team_a: usize,
    player_a: usize,
    team_b: usize,
    player_b: usize,
) -> Result<Partition, BalanceError> {
    let mut next = partition.clone();
    next.swap_players(team_a, player_a, team_b, player_b)?;
    Ok(next)
}

/// Size of each team slot: `ceil(n / k)`.
pub fn slot_size(player_count: usize, team_count: usize) -> usize {
    if team_count == 0 {
        return 0;
    }
    player_count.div_ceil(team_count)
}

/// Shuffles `players` uniformly and cuts them into `team_count` contiguous
/// slots of `ceil(n / k)` players. Trailing teams take whatever is left,
/// which may be nothing.
pub fn build_initial_partition<R: Rng>(
    players: &[Player],
    team_count: usize,
    rng: &mut R,
) -> Result<Partition, BalanceError> {
    if team_count == 0 {
        return Err(BalanceError::ZeroTeams);
    }

    let n = players.len();
    if n == 0 {
        return Ok(Partition::empty(team_count));
    }

    let mut shuffled = players.to_vec();
    shuffled.shuffle(rng);

    let size = slot_size(n, team_count);
    let mut rest = shuffled.into_iter();
    let teams = (0..team_count)
        .map(|_| Team::new(rest.by_ref().take(size).collect()))
        .collect();

    Ok(Partition::new(teams))
}
