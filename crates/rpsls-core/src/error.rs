//! Error types for the settlement protocol.
//!
//! Every variant is a rejected operation: the game and the substrate are left
//! exactly as they were before the call.

use crate::game::{GameId, PartyId};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Errors from protocol operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Guard violation: {0}")]
    GuardViolation(String),

    #[error("Commitment mismatch: revealed move and salt do not match the stored commitment")]
    CommitmentMismatch,

    #[error("Timeout not yet eligible: {remaining_secs}s remaining")]
    TimeoutNotYetEligible { remaining_secs: u64 },

    #[error("Game not found: {0}")]
    NotFound(GameId),

    #[error("Settlement failed: {0}")]
    Settlement(#[from] SettlementError),
}

/// Errors reported by a settlement substrate
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementError {
    #[error("Insufficient funds: {party} needs {needed}, has {available}")]
    InsufficientFunds {
        party: PartyId,
        needed: u64,
        available: u64,
    },

    #[error("Pool mismatch for game {game}: holds {held}, release requested {requested}")]
    PoolMismatch {
        game: GameId,
        held: u64,
        requested: u64,
    },

    #[error("No escrow pool for game {0}")]
    UnknownPool(GameId),

    #[error("Escrow pool already exists for game {0}")]
    DuplicatePool(GameId),

    #[error("Amount overflow")]
    Overflow,
}

/// Stable tag for each error kind, surfaced verbatim to callers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    GuardViolation,
    CommitmentMismatch,
    TimeoutNotYetEligible,
    NotFound,
    Settlement,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::GuardViolation => "guard_violation",
            ErrorKind::CommitmentMismatch => "commitment_mismatch",
            ErrorKind::TimeoutNotYetEligible => "timeout_not_yet_eligible",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Settlement => "settlement",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::InvalidInput(_) => ErrorKind::InvalidInput,
            GameError::GuardViolation(_) => ErrorKind::GuardViolation,
            GameError::CommitmentMismatch => ErrorKind::CommitmentMismatch,
            GameError::TimeoutNotYetEligible { .. } => ErrorKind::TimeoutNotYetEligible,
            GameError::NotFound(_) => ErrorKind::NotFound,
            GameError::Settlement(_) => ErrorKind::Settlement,
        }
    }

    pub(crate) fn guard(message: impl Into<String>) -> Self {
        GameError::GuardViolation(message.into())
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        GameError::InvalidInput(message.into())
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, GameError>;
