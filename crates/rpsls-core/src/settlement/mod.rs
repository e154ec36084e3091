//! Settlement substrate abstraction.
//!
//! The protocol never moves value itself; it asks a [`Settlement`] to escrow
//! stakes and to release whole pools once a game reaches a terminal status.

mod ledger;
mod traits;

pub use ledger::{EntryKind, InMemoryLedger, LedgerEntry};
pub use traits::{Settlement, Transfer};
