//! Player records.
//!
//! Players are read-only input to an optimization call. The optimizer only
//! moves them between teams and never touches their fields.

use std::fmt;
use std::str::FromStr;

use crate::error::BalanceError;

/// Stable player identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Natural playing position.
///
/// `Everything` marks a flexible player who can cover any role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Position {
    Everything,
    Defender,
    Midfielder,
    Forward,
    Goalkeeper,
}

impl Position {
    /// All positions, in declaration order.
    pub const ALL: [Position; 5] = [
        Position::Everything,
        Position::Defender,
        Position::Midfielder,
        Position::Forward,
        Position::Goalkeeper,
    ];

    /// Single-letter roster code.
    pub fn code(self) -> char {
        match self {
            Position::Everything => 'E',
            Position::Defender => 'D',
            Position::Midfielder => 'M',
            Position::Forward => 'F',
            Position::Goalkeeper => 'G',
        }
    }

    /// Goalkeepers and defenders give a team its backbone cover.
    pub fn is_backbone(self) -> bool {
        matches!(self, Position::Goalkeeper | Position::Defender)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Position {
    type Err = BalanceError;

    /// Accepts the letter code or the full name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "e" | "everything" => Ok(Position::Everything),
            "d" | "defender" => Ok(Position::Defender),
            "m" | "midfielder" => Ok(Position::Midfielder),
            "f" | "forward" => Ok(Position::Forward),
            "g" | "goalkeeper" => Ok(Position::Goalkeeper),
            _ => Err(BalanceError::UnknownPosition(s.to_string())),
        }
    }
}

/// A player to be assigned to a team.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Player {
    pub id: PlayerId,
    /// Display name; may be empty.
    pub name: String,
    pub position: Position,
    /// Skill rating, nominally 1-10.
    pub rating: f64,
}

impl Player {
    pub fn new(id: u32, name: impl Into<String>, position: Position, rating: f64) -> Self {
        Self {
            id: PlayerId(id),
            name: name.into(),
            position,
            rating,
        }
    }

    /// Returns `true` if the rating is at or above `threshold`.
    pub fn is_high_rated(&self, threshold: f64) -> bool {
        self.rating >= threshold
    }
}

/// Checks that every rating is a finite number.
pub fn validate_ratings(players: &[Player]) -> Result<(), BalanceError> {
    match players.iter().find(|p| !p.rating.is_finite()) {
        Some(p) => Err(BalanceError::NonFiniteRating {
            id: p.id,
            rating: p.rating,
        }),
        None => Ok(()),
    }
}
