//! Rock-Paper-Scissors-Lizard-Spock moves and winner resolution.

use crate::error::GameError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A move slot. `None` marks an opponent slot that has not been played yet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    #[default]
    None,
    Rock,
    Paper,
    Scissors,
    Spock,
    Lizard,
}

impl Move {
    /// Every move a player may actually play, in tag order.
    pub const PLAYABLE: [Move; 5] = [
        Move::Rock,
        Move::Paper,
        Move::Scissors,
        Move::Spock,
        Move::Lizard,
    ];

    /// Single-byte tag used in the commitment encoding
    pub fn tag(&self) -> u8 {
        match self {
            Move::None => 0,
            Move::Rock => 1,
            Move::Paper => 2,
            Move::Scissors => 3,
            Move::Spock => 4,
            Move::Lizard => 5,
        }
    }

    pub fn from_tag(tag: u8) -> Result<Self, GameError> {
        match tag {
            0 => Ok(Move::None),
            1 => Ok(Move::Rock),
            2 => Ok(Move::Paper),
            3 => Ok(Move::Scissors),
            4 => Ok(Move::Spock),
            5 => Ok(Move::Lizard),
            other => Err(GameError::InvalidInput(format!(
                "move tag {} is outside 0..=5",
                other
            ))),
        }
    }

    /// `true` for the five moves that can be played
    pub fn is_playable(&self) -> bool {
        !matches!(self, Move::None)
    }

    /// Reject the `None` sentinel where a played move is required
    pub fn ensure_playable(self) -> Result<Self, GameError> {
        if self.is_playable() {
            Ok(self)
        } else {
            Err(GameError::InvalidInput(
                "a played move must be one of rock, paper, scissors, spock, lizard".to_string(),
            ))
        }
    }

    /// The two moves this one defeats
    pub fn defeats(&self) -> &'static [Move] {
        match self {
            Move::None => &[],
            Move::Rock => &[Move::Scissors, Move::Lizard],
            Move::Paper => &[Move::Rock, Move::Spock],
            Move::Scissors => &[Move::Paper, Move::Lizard],
            Move::Lizard => &[Move::Paper, Move::Spock],
            Move::Spock => &[Move::Rock, Move::Scissors],
        }
    }

    /// Check if this move beats the other
    pub fn beats(&self, other: &Move) -> bool {
        self.defeats().contains(other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Move::None => "none",
            Move::Rock => "rock",
            Move::Paper => "paper",
            Move::Scissors => "scissors",
            Move::Spock => "spock",
            Move::Lizard => "lizard",
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Move {
    type Err = GameError;

    /// Accepts a name in any case or a numeric tag.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(tag) = s.parse::<u8>() {
            return Move::from_tag(tag);
        }
        match s.to_ascii_lowercase().as_str() {
            "none" | "null" => Ok(Move::None),
            "rock" => Ok(Move::Rock),
            "paper" => Ok(Move::Paper),
            "scissors" => Ok(Move::Scissors),
            "spock" => Ok(Move::Spock),
            "lizard" => Ok(Move::Lizard),
            _ => Err(GameError::InvalidInput(format!("unknown move '{}'", s))),
        }
    }
}

/// Result of a resolved game, from the creator's point of view
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    CreatorWins,
    OpponentWins,
    Tie,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::CreatorWins => "creator wins",
            Outcome::OpponentWins => "opponent wins",
            Outcome::Tie => "tie",
        }
    }

    /// Split a pool of `2 * stake` according to this outcome
    pub fn payout(&self, stake: u64) -> Payout {
        let pool = stake.saturating_mul(2);
        match self {
            Outcome::CreatorWins => Payout {
                creator: pool,
                opponent: 0,
            },
            Outcome::OpponentWins => Payout {
                creator: 0,
                opponent: pool,
            },
            Outcome::Tie => Payout {
                creator: stake,
                opponent: stake,
            },
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Amounts released to each party when a game reaches a terminal status
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub creator: u64,
    pub opponent: u64,
}

impl Payout {
    pub fn total(&self) -> u64 {
        self.creator.saturating_add(self.opponent)
    }
}

/// Decide the winner from the creator's and opponent's revealed moves.
pub fn resolve(creator_move: Move, opponent_move: Move) -> Outcome {
    if creator_move == opponent_move {
        Outcome::Tie
    } else if creator_move.beats(&opponent_move) {
        Outcome::CreatorWins
    } else {
        Outcome::OpponentWins
    }
}
