//! Application state management.

use crate::config::Config;
use rpsls_core::{
    Clock, GameConfig, GameError, GameService, InMemoryLedger, ManualClock, SystemClock,
};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    service: Arc<GameService>,
    /// Simulation substrate backing the service
    ledger: InMemoryLedger,
    /// Present only when time is simulated
    manual_clock: Option<ManualClock>,
}

impl AppState {
    /// Build from settings, seeding ledger accounts
    pub fn from_config(config: &Config) -> Result<Self, GameError> {
        let manual_clock = config.simulated_clock.then(ManualClock::starting_now);
        let clock: Arc<dyn Clock> = match &manual_clock {
            Some(clock) => Arc::new(clock.clone()),
            None => Arc::new(SystemClock),
        };

        let ledger = InMemoryLedger::with_clock(clock.clone());
        for (party, amount) in &config.seed_accounts {
            ledger.deposit(party, *amount)?;
        }

        let game_config = GameConfig::with_timeout_secs(config.timeout_secs)?;
        let service = GameService::new(game_config, Arc::new(ledger.clone()), clock);

        Ok(Self {
            service: Arc::new(service),
            ledger,
            manual_clock,
        })
    }

    /// Simulated clock and default timeout, for tests and demos
    pub fn simulated() -> Self {
        let clock = ManualClock::starting_now();
        let ledger = InMemoryLedger::with_clock(Arc::new(clock.clone()));
        let service = GameService::new(
            GameConfig::default(),
            Arc::new(ledger.clone()),
            Arc::new(clock.clone()),
        );
        Self {
            service: Arc::new(service),
            ledger,
            manual_clock: Some(clock),
        }
    }

    pub fn service(&self) -> &GameService {
        &self.service
    }

    pub fn ledger(&self) -> &InMemoryLedger {
        &self.ledger
    }

    pub fn manual_clock(&self) -> Option<&ManualClock> {
        self.manual_clock.as_ref()
    }
}
