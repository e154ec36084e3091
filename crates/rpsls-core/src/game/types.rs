//! Identifiers and status for game records.

use crate::error::GameError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Longest party identifier accepted
pub const MAX_PARTY_ID_LEN: usize = 128;

/// Unique game identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(Uuid);

impl GameId {
    /// Create a new random game ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for GameId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for GameId {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| GameError::InvalidInput(format!("malformed game id: {}", e)))
    }
}

impl fmt::Debug for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GameId({})", self.0)
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a party (account, address or handle) on the substrate.
///
/// Well-formed ids are 1..=128 characters of ASCII letters, digits and
/// `-_.:@`. Comparison is case-insensitive for `0x` hex addresses only.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PartyId(String);

impl PartyId {
    pub fn new(id: impl Into<String>) -> Result<Self, GameError> {
        let id = id.into();
        let id = id.trim();
        if id.is_empty() || id.len() > MAX_PARTY_ID_LEN {
            return Err(GameError::InvalidInput(format!(
                "party id must be 1 to {} characters",
                MAX_PARTY_ID_LEN
            )));
        }
        if let Some(bad) = id
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || "-_.:@".contains(*c)))
        {
            return Err(GameError::InvalidInput(format!(
                "party id contains invalid character {:?}",
                bad
            )));
        }

        let is_hex_address = id.len() > 2
            && (id.starts_with("0x") || id.starts_with("0X"))
            && id[2..].chars().all(|c| c.is_ascii_hexdigit());
        if is_hex_address {
            Ok(Self(id.to_ascii_lowercase()))
        } else {
            Ok(Self(id.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PartyId {
    type Error = GameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PartyId> for String {
    fn from(id: PartyId) -> Self {
        id.0
    }
}

impl FromStr for PartyId {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Debug for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PartyId({})", self.0)
    }
}

impl fmt::Display for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle status of a game
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    AwaitingOpponent,
    AwaitingReveal,
    Resolved,
    TimedOutCreatorWins,
    TimedOutOpponentWins,
}

impl GameStatus {
    /// No transition leaves a terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GameStatus::Resolved | GameStatus::TimedOutCreatorWins | GameStatus::TimedOutOpponentWins
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::AwaitingOpponent => "awaiting_opponent",
            GameStatus::AwaitingReveal => "awaiting_reveal",
            GameStatus::Resolved => "resolved",
            GameStatus::TimedOutCreatorWins => "timed_out_creator_wins",
            GameStatus::TimedOutOpponentWins => "timed_out_opponent_wins",
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
