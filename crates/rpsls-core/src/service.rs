//! Caller-facing operations: one method per protocol action or read.
//!
//! Each game is locked for the whole of an operation, so transitions on the
//! same game are linearized while different games proceed independently.

use crate::clock::Clock;
use crate::config::GameConfig;
use crate::crypto::{self, Commitment, Salt};
use crate::error::{GameError, Result};
use crate::game::{Effect, GameId, GameInstance, GameRegistry, GameView, PartyId, Step};
use crate::rules::{Move, Outcome, Payout};
use crate::settlement::{Settlement, Transfer};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of a successful reveal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub outcome: Outcome,
    pub payout: Payout,
}

pub struct GameService {
    registry: GameRegistry,
    settlement: Arc<dyn Settlement>,
    clock: Arc<dyn Clock>,
    config: GameConfig,
}

impl GameService {
    pub fn new(config: GameConfig, settlement: Arc<dyn Settlement>, clock: Arc<dyn Clock>) -> Self {
        Self {
            registry: GameRegistry::new(),
            settlement,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn registry(&self) -> &GameRegistry {
        &self.registry
    }

    /// Open a game and escrow the creator's stake
    pub async fn create_game(
        &self,
        creator: PartyId,
        opponent: PartyId,
        stake: u64,
        commitment: Commitment,
    ) -> Result<GameId> {
        let id = self.registry.allocate_id();
        let instance = GameInstance::create(
            id,
            creator,
            opponent,
            stake,
            commitment,
            self.config.timeout_window,
            self.clock.now(),
        )
        .map_err(|e| rejected("create", None, e))?;

        self.settlement
            .open_pool(id, &instance.creator, stake)
            .await
            .map_err(|e| rejected("create", Some(id), e.into()))?;

        let creator = instance.creator.clone();
        let opponent = instance.opponent.clone();
        if let Err(e) = self.registry.insert(instance) {
            // id collided after escrow; hand the stake straight back
            let refund = [Transfer {
                to: creator,
                amount: stake,
            }];
            self.settlement.release(id, &refund).await?;
            return Err(rejected("create", Some(id), e));
        }

        info!(game_id = %id, %creator, %opponent, stake, "Game created");
        Ok(id)
    }

    /// Opponent plays a move and escrows exactly the stake
    pub async fn play_move(
        &self,
        id: GameId,
        caller: &PartyId,
        mv: Move,
        amount: u64,
    ) -> Result<()> {
        let slot = self.registry.get(id)?;
        let mut game = slot.lock().await;

        let step = game
            .play(caller, mv, amount, self.clock.now())
            .map_err(|e| rejected("play", Some(id), e))?;
        self.commit(&mut game, step).await?;

        info!(game_id = %id, %caller, "Opponent played");
        Ok(())
    }

    /// Creator reveals; the pool is paid out by the winner rule
    pub async fn reveal_move(
        &self,
        id: GameId,
        caller: &PartyId,
        mv: Move,
        salt: &Salt,
    ) -> Result<Resolution> {
        let slot = self.registry.get(id)?;
        let mut game = slot.lock().await;

        let step = game
            .reveal(caller, mv, salt, self.clock.now())
            .map_err(|e| rejected("reveal", Some(id), e))?;
        let payout = released(&step);
        let outcome = step
            .next
            .outcome
            .ok_or_else(|| GameError::GuardViolation("reveal produced no outcome".to_string()))?;
        self.commit(&mut game, step).await?;

        info!(
            game_id = %id,
            creator_move = %mv,
            opponent_move = %game.opponent_move,
            %outcome,
            "Game resolved"
        );
        Ok(Resolution { outcome, payout })
    }

    /// Refund the creator when the opponent never played
    pub async fn claim_creator_timeout(&self, id: GameId) -> Result<Payout> {
        let slot = self.registry.get(id)?;
        let mut game = slot.lock().await;

        let step = game
            .claim_creator_timeout(self.clock.now())
            .map_err(|e| rejected("creator timeout", Some(id), e))?;
        let payout = released(&step);
        self.commit(&mut game, step).await?;

        info!(game_id = %id, refund = payout.creator, "Creator timeout claimed");
        Ok(payout)
    }

    /// Pay the opponent the whole pool when the creator never revealed
    pub async fn claim_opponent_timeout(&self, id: GameId) -> Result<Payout> {
        let slot = self.registry.get(id)?;
        let mut game = slot.lock().await;

        let step = game
            .claim_opponent_timeout(self.clock.now())
            .map_err(|e| rejected("opponent timeout", Some(id), e))?;
        let payout = released(&step);
        self.commit(&mut game, step).await?;

        info!(game_id = %id, paid = payout.opponent, "Opponent timeout claimed");
        Ok(payout)
    }

    /// Snapshot of a game; `pooled` is what the substrate reports holding
    pub async fn get_game_state(&self, id: GameId) -> Result<GameView> {
        let slot = self.registry.get(id)?;
        let game = slot.lock().await;

        let mut view = game.view(self.clock.now());
        view.pooled = self.settlement.held(id).await?;
        if view.pooled != game.pool() {
            warn!(game_id = %id, expected = game.pool(), held = view.pooled, "Pool out of step with game record");
        }
        Ok(view)
    }

    /// Pure helper so callers can check a commitment before submitting it
    pub fn compute_commitment(mv: Move, salt: &Salt) -> Result<Commitment> {
        let mv = mv.ensure_playable()?;
        Ok(crypto::commit(mv, salt))
    }

    pub fn generate_secret() -> Salt {
        crypto::generate_secret()
    }

    /// Ask the substrate to move value, then make the transition visible
    async fn commit(&self, game: &mut GameInstance, step: Step) -> Result<()> {
        let id = game.id;
        match &step.effect {
            Effect::Escrow { from, amount } => {
                self.settlement
                    .escrow(id, from, *amount)
                    .await
                    .map_err(|e| rejected("escrow", Some(id), e.into()))?;
            }
            Effect::Release(payout) => {
                let transfers = [
                    Transfer {
                        to: game.creator.clone(),
                        amount: payout.creator,
                    },
                    Transfer {
                        to: game.opponent.clone(),
                        amount: payout.opponent,
                    },
                ];
                self.settlement
                    .release(id, &transfers)
                    .await
                    .map_err(|e| rejected("release", Some(id), e.into()))?;
            }
        }

        debug!(game_id = %id, from = %game.status, to = %step.next.status, "Transition committed");
        *game = step.next;
        Ok(())
    }
}

fn released(step: &Step) -> Payout {
    match step.effect {
        Effect::Release(payout) => payout,
        Effect::Escrow { .. } => Payout::default(),
    }
}

fn rejected(operation: &str, id: Option<GameId>, err: GameError) -> GameError {
    match id {
        Some(id) => warn!(game_id = %id, operation, kind = %err.kind(), "Rejected: {}", err),
        None => warn!(operation, kind = %err.kind(), "Rejected: {}", err),
    }
    err
}
