//! In-memory settlement substrate with an append-only journal.

use super::traits::{Settlement, Transfer};
use crate::clock::{Clock, SystemClock};
use crate::error::SettlementError;
use crate::game::{GameId, PartyId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Kind of balance movement recorded in the journal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Deposit,
    Escrow,
    Release,
}

/// One journal record
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    pub seq: u64,
    pub at: DateTime<Utc>,
    pub kind: EntryKind,
    pub game: Option<GameId>,
    pub party: PartyId,
    pub amount: u64,
}

/// Every balance and pool is bounded by `supply`, so credits inside the
/// ledger never overflow once a deposit has been accepted.
#[derive(Default)]
struct LedgerState {
    supply: u64,
    balances: HashMap<PartyId, u64>,
    pools: HashMap<GameId, u64>,
    journal: Vec<LedgerEntry>,
}

impl LedgerState {
    fn record(
        &mut self,
        at: DateTime<Utc>,
        kind: EntryKind,
        game: Option<GameId>,
        party: &PartyId,
        amount: u64,
    ) {
        let seq = self.journal.len() as u64 + 1;
        self.journal.push(LedgerEntry {
            seq,
            at,
            kind,
            game,
            party: party.clone(),
            amount,
        });
    }

    fn debit(&mut self, party: &PartyId, amount: u64) -> Result<(), SettlementError> {
        let available = self.balances.get(party).copied().unwrap_or(0);
        if available < amount {
            return Err(SettlementError::InsufficientFunds {
                party: party.clone(),
                needed: amount,
                available,
            });
        }
        self.balances.insert(party.clone(), available - amount);
        Ok(())
    }
}

/// Account balances and escrow pools held in memory
#[derive(Clone)]
pub struct InMemoryLedger {
    state: Arc<Mutex<LedgerState>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Journal timestamps come from `clock`
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(Mutex::new(LedgerState::default())),
            clock,
        }
    }

    /// Credit a party's free balance
    pub fn deposit(&self, party: &PartyId, amount: u64) -> Result<u64, SettlementError> {
        let at = self.clock.now();
        let mut state = self.lock();
        let supply = state
            .supply
            .checked_add(amount)
            .ok_or(SettlementError::Overflow)?;
        let current = state.balances.get(party).copied().unwrap_or(0);
        let updated = current
            .checked_add(amount)
            .ok_or(SettlementError::Overflow)?;
        state.supply = supply;
        state.balances.insert(party.clone(), updated);
        state.record(at, EntryKind::Deposit, None, party, amount);
        Ok(updated)
    }

    /// Copy of the journal, oldest first
    pub fn journal(&self) -> Vec<LedgerEntry> {
        self.lock().journal.clone()
    }

    /// Journal records for one game
    pub fn journal_for(&self, game: GameId) -> Vec<LedgerEntry> {
        self.lock()
            .journal
            .iter()
            .filter(|e| e.game == Some(game))
            .cloned()
            .collect()
    }

    /// Sum of all free balances and pools
    pub fn total_supply(&self) -> u64 {
        self.lock().supply
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Settlement for InMemoryLedger {
    async fn open_pool(
        &self,
        game: GameId,
        from: &PartyId,
        amount: u64,
    ) -> Result<(), SettlementError> {
        let at = self.clock.now();
        let mut state = self.lock();
        if state.pools.contains_key(&game) {
            return Err(SettlementError::DuplicatePool(game));
        }
        state.debit(from, amount)?;
        state.pools.insert(game, amount);
        state.record(at, EntryKind::Escrow, Some(game), from, amount);
        Ok(())
    }

    async fn escrow(
        &self,
        game: GameId,
        from: &PartyId,
        amount: u64,
    ) -> Result<(), SettlementError> {
        let at = self.clock.now();
        let mut state = self.lock();
        let held = *state
            .pools
            .get(&game)
            .ok_or(SettlementError::UnknownPool(game))?;
        let updated = held.checked_add(amount).ok_or(SettlementError::Overflow)?;
        state.debit(from, amount)?;
        state.pools.insert(game, updated);
        state.record(at, EntryKind::Escrow, Some(game), from, amount);
        Ok(())
    }

    async fn release(&self, game: GameId, transfers: &[Transfer]) -> Result<(), SettlementError> {
        let at = self.clock.now();
        let mut state = self.lock();
        let held = *state
            .pools
            .get(&game)
            .ok_or(SettlementError::UnknownPool(game))?;
        let requested = transfers
            .iter()
            .try_fold(0u64, |sum, t| sum.checked_add(t.amount))
            .ok_or(SettlementError::Overflow)?;
        if requested != held {
            return Err(SettlementError::PoolMismatch {
                game,
                held,
                requested,
            });
        }

        // validate every credit before applying any of them
        let mut credits: HashMap<&PartyId, u64> = HashMap::new();
        for t in transfers {
            let base = match credits.get(&t.to) {
                Some(pending) => *pending,
                None => state.balances.get(&t.to).copied().unwrap_or(0),
            };
            let next = base.checked_add(t.amount).ok_or(SettlementError::Overflow)?;
            credits.insert(&t.to, next);
        }

        for (party, balance) in credits {
            state.balances.insert(party.clone(), balance);
        }
        state.pools.insert(game, 0);
        for t in transfers.iter().filter(|t| t.amount > 0) {
            state.record(at, EntryKind::Release, Some(game), &t.to, t.amount);
        }
        Ok(())
    }

    async fn held(&self, game: GameId) -> Result<u64, SettlementError> {
        self.lock()
            .pools
            .get(&game)
            .copied()
            .ok_or(SettlementError::UnknownPool(game))
    }

    async fn balance(&self, party: &PartyId) -> Result<u64, SettlementError> {
        Ok(self.lock().balances.get(party).copied().unwrap_or(0))
    }
}
