//! Settlement substrate trait definition.

use crate::error::SettlementError;
use crate::game::{GameId, PartyId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One leg of a pool release
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub to: PartyId,
    pub amount: u64,
}

/// Value-transfer and custody operations the protocol needs.
///
/// Implementations can be:
/// - InMemoryLedger for simulation and testing
/// - a ledger or payment-channel backend in production
///
/// Every method is all-or-nothing: on `Err` no balance or pool has changed.
#[async_trait]
pub trait Settlement: Send + Sync {
    /// Create the escrow pool for a new game, funded by `from`
    async fn open_pool(
        &self,
        game: GameId,
        from: &PartyId,
        amount: u64,
    ) -> Result<(), SettlementError>;

    /// Move `amount` from `from` into an existing pool
    async fn escrow(&self, game: GameId, from: &PartyId, amount: u64)
        -> Result<(), SettlementError>;

    /// Pay out the whole pool. The transfers must add up to the held amount.
    async fn release(&self, game: GameId, transfers: &[Transfer]) -> Result<(), SettlementError>;

    /// Amount currently held for a game
    async fn held(&self, game: GameId) -> Result<u64, SettlementError>;

    /// Free (unescrowed) balance of a party
    async fn balance(&self, party: &PartyId) -> Result<u64, SettlementError>;
}
