//! Keyed table of game records.

use super::instance::GameInstance;
use super::types::GameId;
use crate::error::{GameError, Result};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::Mutex;

/// Shared handle to one game; holding the lock linearizes its transitions
pub type GameSlot = Arc<Mutex<GameInstance>>;

/// Maps game ids to their records. Holds no protocol rules.
#[derive(Default)]
pub struct GameRegistry {
    games: RwLock<HashMap<GameId, GameSlot>>,
}

impl GameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick an identifier not currently in use
    pub fn allocate_id(&self) -> GameId {
        let games = self.games.read().unwrap_or_else(PoisonError::into_inner);
        loop {
            let id = GameId::new();
            if !games.contains_key(&id) {
                return id;
            }
        }
    }

    /// Store a new record under its own id
    pub fn insert(&self, instance: GameInstance) -> Result<GameSlot> {
        let mut games = self.games.write().unwrap_or_else(PoisonError::into_inner);
        match games.entry(instance.id) {
            Entry::Occupied(_) => Err(GameError::GuardViolation(format!(
                "game id {} already in use",
                instance.id
            ))),
            Entry::Vacant(slot) => Ok(slot.insert(Arc::new(Mutex::new(instance))).clone()),
        }
    }

    pub fn get(&self, id: GameId) -> Result<GameSlot> {
        self.games
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
            .ok_or(GameError::NotFound(id))
    }

    pub fn contains(&self, id: GameId) -> bool {
        self.games
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.games.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
