//! RPSLS Core Library
//!
//! Settlement protocol for two-party, staked Rock-Paper-Scissors-Lizard-Spock
//! games using commit-reveal. This crate provides the commitment scheme, the
//! winner and timeout rules, the per-game state machine, a game registry and a
//! substrate abstraction for escrowing and releasing stakes.

pub mod clock;
pub mod config;
pub mod crypto;
pub mod error;
pub mod game;
pub mod rules;
pub mod service;
pub mod settlement;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::GameConfig;
pub use crypto::{Commitment, Salt, COMMITMENT_LAYOUT};
pub use error::{ErrorKind, GameError, SettlementError};
pub use game::{GameId, GameInstance, GameRegistry, GameStatus, GameView, PartyId};
pub use rules::{resolve, Move, Outcome, Payout};
pub use service::{GameService, Resolution};
pub use settlement::{InMemoryLedger, LedgerEntry, Settlement, Transfer};
