//! Per-game state machine.
//!
//! Transitions are computed without side effects: each operation checks its
//! guards against the current record and returns a [`Step`] holding the next
//! record plus the value movement the substrate must perform. The caller
//! commits `Step::next` only after the substrate accepted `Step::effect`, so a
//! rejected operation never leaves a partial change behind.

use super::types::{GameId, GameStatus, PartyId};
use crate::crypto::{Commitment, Salt};
use crate::error::{GameError, Result};
use crate::rules::{self, timeout, Move, Outcome, Payout};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// One game's record
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameInstance {
    pub id: GameId,
    pub stake: u64,
    pub creator: PartyId,
    pub opponent: PartyId,
    pub commitment: Commitment,
    pub opponent_move: Move,
    /// Set when the creator reveals
    pub creator_move: Move,
    pub outcome: Option<Outcome>,
    pub status: GameStatus,
    pub created_at: DateTime<Utc>,
    pub last_action_time: DateTime<Utc>,
    pub timeout_window: Duration,
}

/// Value movement a transition asks of the substrate
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Move `amount` from `from` into the game's pool
    Escrow { from: PartyId, amount: u64 },
    /// Empty the pool to the parties
    Release(Payout),
}

/// A validated transition that has not been committed yet
#[derive(Clone, Debug)]
pub struct Step {
    pub next: GameInstance,
    pub effect: Effect,
}

impl GameInstance {
    /// Validate a creation request and build the initial record.
    ///
    /// The creator's escrow of `stake` is the caller's job; this only checks
    /// the request.
    pub fn create(
        id: GameId,
        creator: PartyId,
        opponent: PartyId,
        stake: u64,
        commitment: Commitment,
        timeout_window: Duration,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        if stake == 0 {
            return Err(GameError::invalid("stake must be positive"));
        }
        if stake > u64::MAX / 2 {
            return Err(GameError::invalid("stake too large to pool"));
        }
        if creator == opponent {
            return Err(GameError::invalid("creator cannot play against themselves"));
        }
        if timeout_window <= Duration::zero() {
            return Err(GameError::invalid("timeout window must be positive"));
        }

        Ok(Self {
            id,
            stake,
            creator,
            opponent,
            commitment,
            opponent_move: Move::None,
            creator_move: Move::None,
            outcome: None,
            status: GameStatus::AwaitingOpponent,
            created_at: now,
            last_action_time: now,
            timeout_window,
        })
    }

    /// Opponent commits their move in the clear and escrows a matching stake
    pub fn play(&self, caller: &PartyId, mv: Move, amount: u64, now: DateTime<Utc>) -> Result<Step> {
        self.require_status(GameStatus::AwaitingOpponent, "play")?;
        if *caller != self.opponent {
            return Err(GameError::guard("only the opponent may play"));
        }
        let mv = mv.ensure_playable()?;
        if amount != self.stake {
            return Err(GameError::guard(format!(
                "escrow must equal the stake of {}, got {}",
                self.stake, amount
            )));
        }

        let mut next = self.clone();
        next.opponent_move = mv;
        next.last_action_time = now;
        next.status = GameStatus::AwaitingReveal;

        Ok(Step {
            next,
            effect: Effect::Escrow {
                from: caller.clone(),
                amount,
            },
        })
    }

    /// Creator opens the commitment; the winner takes the pool
    pub fn reveal(
        &self,
        caller: &PartyId,
        mv: Move,
        salt: &Salt,
        now: DateTime<Utc>,
    ) -> Result<Step> {
        self.require_status(GameStatus::AwaitingReveal, "reveal")?;
        if *caller != self.creator {
            return Err(GameError::guard("only the creator may reveal"));
        }
        let mv = mv.ensure_playable()?;
        if !self.commitment.verify(mv, salt) {
            return Err(GameError::CommitmentMismatch);
        }

        let outcome = rules::resolve(mv, self.opponent_move);
        let payout = outcome.payout(self.stake);

        let mut next = self.clone();
        next.creator_move = mv;
        next.outcome = Some(outcome);
        next.last_action_time = now;
        next.status = GameStatus::Resolved;

        Ok(Step {
            next,
            effect: Effect::Release(payout),
        })
    }

    /// Opponent never played: creator takes back their own stake
    pub fn claim_creator_timeout(&self, now: DateTime<Utc>) -> Result<Step> {
        self.require_status(GameStatus::AwaitingOpponent, "claim a creator timeout")?;
        self.require_timed_out(now)?;

        let mut next = self.clone();
        next.last_action_time = now;
        next.status = GameStatus::TimedOutCreatorWins;

        Ok(Step {
            next,
            effect: Effect::Release(Payout {
                creator: self.stake,
                opponent: 0,
            }),
        })
    }

    /// Creator never revealed: opponent takes the whole pool
    pub fn claim_opponent_timeout(&self, now: DateTime<Utc>) -> Result<Step> {
        self.require_status(GameStatus::AwaitingReveal, "claim an opponent timeout")?;
        self.require_timed_out(now)?;

        let mut next = self.clone();
        next.last_action_time = now;
        next.status = GameStatus::TimedOutOpponentWins;

        Ok(Step {
            next,
            effect: Effect::Release(Payout {
                creator: 0,
                opponent: self.pool(),
            }),
        })
    }

    /// Funds the substrate should be holding for this game right now
    pub fn pool(&self) -> u64 {
        match self.status {
            GameStatus::AwaitingOpponent => self.stake,
            GameStatus::AwaitingReveal => self.stake * 2,
            _ => 0,
        }
    }

    pub fn is_timed_out(&self, now: DateTime<Utc>) -> bool {
        timeout::is_timed_out(self.last_action_time, self.timeout_window, now)
    }

    /// Read-only snapshot for callers
    pub fn view(&self, now: DateTime<Utc>) -> GameView {
        let open = !self.status.is_terminal();
        GameView {
            game_id: self.id,
            stake: self.stake,
            creator: self.creator.clone(),
            opponent: self.opponent.clone(),
            commitment: self.commitment,
            opponent_move: self.opponent_move,
            status: self.status,
            last_action_time: self.last_action_time,
            timeout_window_secs: self.timeout_window.num_seconds(),
            timeout_at: if open {
                timeout::deadline(self.last_action_time, self.timeout_window)
            } else {
                None
            },
            seconds_until_timeout: if open {
                timeout::remaining_secs(self.last_action_time, self.timeout_window, now)
            } else {
                0
            },
            timeout_eligible: open && self.is_timed_out(now),
            outcome: self.outcome,
            creator_move: self.creator_move.is_playable().then_some(self.creator_move),
            created_at: self.created_at,
            pooled: self.pool(),
        }
    }

    fn require_status(&self, expected: GameStatus, action: &str) -> Result<()> {
        if self.status == expected {
            Ok(())
        } else {
            Err(GameError::guard(format!(
                "cannot {} while game is {} (needs {})",
                action, self.status, expected
            )))
        }
    }

    fn require_timed_out(&self, now: DateTime<Utc>) -> Result<()> {
        if self.is_timed_out(now) {
            Ok(())
        } else {
            Err(GameError::TimeoutNotYetEligible {
                remaining_secs: timeout::remaining_secs(
                    self.last_action_time,
                    self.timeout_window,
                    now,
                ),
            })
        }
    }
}

/// Snapshot returned by `get_game_state`
#[derive(Clone, Debug, Serialize)]
pub struct GameView {
    pub game_id: GameId,
    pub stake: u64,
    pub creator: PartyId,
    pub opponent: PartyId,
    pub commitment: Commitment,
    pub opponent_move: Move,
    pub status: GameStatus,
    pub last_action_time: DateTime<Utc>,
    pub timeout_window_secs: i64,
    pub timeout_at: Option<DateTime<Utc>>,
    pub seconds_until_timeout: u64,
    pub timeout_eligible: bool,
    pub outcome: Option<Outcome>,
    pub creator_move: Option<Move>,
    pub created_at: DateTime<Utc>,
    pub pooled: u64,
}
