//! End-to-end settlement flows against the in-memory ledger.
//!
//! Run with: cargo test -p rpsls-core --test game_flow

use chrono::Duration;
use rpsls_core::{
    Commitment, GameConfig, GameError, GameId, GameService, GameStatus, InMemoryLedger,
    ManualClock, Move, Outcome, PartyId, Salt, Settlement,
};
use std::sync::Arc;

struct Harness {
    service: Arc<GameService>,
    ledger: InMemoryLedger,
    clock: ManualClock,
    alice: PartyId,
    bob: PartyId,
}

impl Harness {
    fn new() -> Self {
        let clock = ManualClock::starting_now();
        let ledger = InMemoryLedger::with_clock(Arc::new(clock.clone()));
        let alice = PartyId::new("alice").unwrap();
        let bob = PartyId::new("bob").unwrap();
        ledger.deposit(&alice, 1000).unwrap();
        ledger.deposit(&bob, 1000).unwrap();

        let service = GameService::new(
            GameConfig::default(),
            Arc::new(ledger.clone()),
            Arc::new(clock.clone()),
        );

        Self {
            service: Arc::new(service),
            ledger,
            clock,
            alice,
            bob,
        }
    }

    async fn create(&self, mv: Move, salt: &Salt, stake: u64) -> GameId {
        self.service
            .create_game(
                self.alice.clone(),
                self.bob.clone(),
                stake,
                Commitment::new(mv, salt),
            )
            .await
            .expect("create game")
    }

    async fn balance(&self, party: &PartyId) -> u64 {
        self.ledger.balance(party).await.unwrap()
    }

    fn wait_out_window(&self) {
        self.clock.advance(Duration::seconds(300)).unwrap();
    }
}

/// Rock (committed) vs Scissors: creator takes the 200 pool
#[tokio::test]
async fn test_creator_wins_full_pool() {
    let h = Harness::new();
    let salt = Salt::from_u128(0x5eed);
    let id = h.create(Move::Rock, &salt, 100).await;

    h.service
        .play_move(id, &h.bob, Move::Scissors, 100)
        .await
        .unwrap();
    let view = h.service.get_game_state(id).await.unwrap();
    assert_eq!(view.status, GameStatus::AwaitingReveal);
    assert_eq!(view.pooled, 200);

    let resolution = h
        .service
        .reveal_move(id, &h.alice, Move::Rock, &salt)
        .await
        .unwrap();
    assert_eq!(resolution.outcome, Outcome::CreatorWins);
    assert_eq!(resolution.payout.creator, 200);

    let view = h.service.get_game_state(id).await.unwrap();
    assert_eq!(view.status, GameStatus::Resolved);
    assert_eq!(view.creator_move, Some(Move::Rock));
    assert_eq!(view.pooled, 0);
    assert_eq!(h.balance(&h.alice).await, 1100);
    assert_eq!(h.balance(&h.bob).await, 900);
}

/// Paper beats committed Rock: opponent takes the pool
#[tokio::test]
async fn test_opponent_wins_full_pool() {
    let h = Harness::new();
    let salt = Salt::random();
    let id = h.create(Move::Rock, &salt, 100).await;

    h.service
        .play_move(id, &h.bob, Move::Paper, 100)
        .await
        .unwrap();
    let resolution = h
        .service
        .reveal_move(id, &h.alice, Move::Rock, &salt)
        .await
        .unwrap();

    assert_eq!(resolution.outcome, Outcome::OpponentWins);
    assert_eq!(h.balance(&h.alice).await, 900);
    assert_eq!(h.balance(&h.bob).await, 1100);
}

#[tokio::test]
async fn test_tie_returns_each_stake() {
    let h = Harness::new();
    let salt = Salt::random();
    let id = h.create(Move::Lizard, &salt, 250).await;

    h.service
        .play_move(id, &h.bob, Move::Lizard, 250)
        .await
        .unwrap();
    let resolution = h
        .service
        .reveal_move(id, &h.alice, Move::Lizard, &salt)
        .await
        .unwrap();

    assert_eq!(resolution.outcome, Outcome::Tie);
    assert_eq!(h.balance(&h.alice).await, 1000);
    assert_eq!(h.balance(&h.bob).await, 1000);
}

/// Stake 50, opponent never shows: creator gets 50 back once, and only once
#[tokio::test]
async fn test_creator_timeout_refund() {
    let h = Harness::new();
    let id = h.create(Move::Paper, &Salt::random(), 50).await;
    assert_eq!(h.balance(&h.alice).await, 950);

    let early = h.service.claim_creator_timeout(id).await;
    assert!(matches!(early, Err(GameError::TimeoutNotYetEligible { .. })));

    h.wait_out_window();
    let payout = h.service.claim_creator_timeout(id).await.unwrap();
    assert_eq!(payout.creator, 50);
    assert_eq!(h.balance(&h.alice).await, 1000);

    let view = h.service.get_game_state(id).await.unwrap();
    assert_eq!(view.status, GameStatus::TimedOutCreatorWins);

    let second = h.service.claim_creator_timeout(id).await;
    assert!(matches!(second, Err(GameError::GuardViolation(_))));
    assert_eq!(h.balance(&h.alice).await, 1000);
}

/// Wrong salt is rejected without side effects; the opponent can still
/// collect after the window
#[tokio::test]
async fn test_wrong_salt_then_opponent_timeout() {
    let h = Harness::new();
    let salt = Salt::random();
    let id = h.create(Move::Spock, &salt, 100).await;
    h.service
        .play_move(id, &h.bob, Move::Rock, 100)
        .await
        .unwrap();

    let bad = h
        .service
        .reveal_move(id, &h.alice, Move::Spock, &Salt::random())
        .await;
    assert_eq!(bad.unwrap_err(), GameError::CommitmentMismatch);

    let view = h.service.get_game_state(id).await.unwrap();
    assert_eq!(view.status, GameStatus::AwaitingReveal);
    assert_eq!(view.pooled, 200);

    h.wait_out_window();
    let payout = h.service.claim_opponent_timeout(id).await.unwrap();
    assert_eq!(payout.opponent, 200);
    assert_eq!(h.balance(&h.bob).await, 1100);
    assert_eq!(h.balance(&h.alice).await, 900);

    let late_reveal = h.service.reveal_move(id, &h.alice, Move::Spock, &salt).await;
    assert!(matches!(late_reveal, Err(GameError::GuardViolation(_))));
}

#[tokio::test]
async fn test_no_double_spend_after_resolution() {
    let h = Harness::new();
    let salt = Salt::random();
    let id = h.create(Move::Scissors, &salt, 100).await;
    h.service
        .play_move(id, &h.bob, Move::Paper, 100)
        .await
        .unwrap();
    h.service
        .reveal_move(id, &h.alice, Move::Scissors, &salt)
        .await
        .unwrap();
    let supply = h.ledger.total_supply();
    h.wait_out_window();

    let attempts = [
        h.service.play_move(id, &h.bob, Move::Rock, 100).await.err(),
        h.service
            .reveal_move(id, &h.alice, Move::Scissors, &salt)
            .await
            .err(),
        h.service.claim_creator_timeout(id).await.err(),
        h.service.claim_opponent_timeout(id).await.err(),
    ];
    for err in attempts {
        assert!(matches!(err, Some(GameError::GuardViolation(_))));
    }
    assert_eq!(h.ledger.total_supply(), supply);
    assert_eq!(h.ledger.held(id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_inexact_escrow_rejected() {
    let h = Harness::new();
    let id = h.create(Move::Rock, &Salt::random(), 100).await;

    let partial = h.service.play_move(id, &h.bob, Move::Paper, 40).await;
    assert!(matches!(partial, Err(GameError::GuardViolation(_))));
    assert_eq!(h.balance(&h.bob).await, 1000);

    let stranger = PartyId::new("mallory").unwrap();
    let intruder = h.service.play_move(id, &stranger, Move::Paper, 100).await;
    assert!(matches!(intruder, Err(GameError::GuardViolation(_))));
}

/// Racing claims on one game: exactly one commits
#[tokio::test]
async fn test_concurrent_claims_linearized() {
    let h = Harness::new();
    let id = h.create(Move::Rock, &Salt::random(), 100).await;
    h.wait_out_window();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = Arc::clone(&h.service);
            tokio::spawn(async move { service.claim_creator_timeout(id).await })
        })
        .collect();

    let mut ok = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => ok += 1,
            Err(e) => assert!(matches!(e, GameError::GuardViolation(_))),
        }
    }
    assert_eq!(ok, 1);
    assert_eq!(h.balance(&h.alice).await, 1000);
}

#[tokio::test]
async fn test_independent_games_do_not_interfere() {
    let h = Harness::new();
    let salt_a = Salt::random();
    let salt_b = Salt::random();
    let a = h.create(Move::Rock, &salt_a, 100).await;
    let b = h.create(Move::Paper, &salt_b, 200).await;

    h.service
        .play_move(b, &h.bob, Move::Scissors, 200)
        .await
        .unwrap();
    h.service
        .reveal_move(b, &h.alice, Move::Paper, &salt_b)
        .await
        .unwrap();

    let view_a = h.service.get_game_state(a).await.unwrap();
    assert_eq!(view_a.status, GameStatus::AwaitingOpponent);
    assert_eq!(view_a.pooled, 100);
    assert_eq!(h.ledger.journal_for(a).len(), 1);
}

/// A whale filling the ledger to capacity cannot block the payout of a live
/// game
#[tokio::test]
async fn test_saturated_ledger_still_settles() {
    let h = Harness::new();
    let salt = Salt::random();
    let id = h.create(Move::Rock, &salt, 100).await;
    h.service
        .play_move(id, &h.bob, Move::Rock, 100)
        .await
        .unwrap();

    assert!(h.ledger.deposit(&h.bob, u64::MAX).is_err());
    h.ledger.deposit(&h.bob, u64::MAX - 2000).unwrap();
    assert_eq!(h.ledger.total_supply(), u64::MAX);

    let resolution = h
        .service
        .reveal_move(id, &h.alice, Move::Rock, &salt)
        .await
        .unwrap();
    assert_eq!(resolution.outcome, Outcome::Tie);
    assert_eq!(h.balance(&h.alice).await, 1000);
    assert_eq!(h.balance(&h.bob).await, u64::MAX - 1000);
    assert_eq!(h.ledger.total_supply(), u64::MAX);
}
