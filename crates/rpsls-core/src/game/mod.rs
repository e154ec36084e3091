//! Game records, the per-game state machine and the registry.

mod instance;
mod registry;
mod types;

pub use instance::{Effect, GameInstance, GameView, Step};
pub use registry::{GameRegistry, GameSlot};
pub use types::{GameId, GameStatus, PartyId, MAX_PARTY_ID_LEN};
