//! RPSLS settlement service
//!
//! HTTP front end over the commit-reveal game protocol and its in-memory
//! settlement ledger.

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use handlers::*;
pub use state::AppState;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Games
        .route("/api/games", post(create_game))
        .route("/api/games/:id", get(get_game))
        .route("/api/games/:id/play", post(play_move))
        .route("/api/games/:id/reveal", post(reveal_move))
        .route("/api/games/:id/timeout/creator", post(claim_creator_timeout))
        .route("/api/games/:id/timeout/opponent", post(claim_opponent_timeout))
        .route("/api/commitment", post(compute_commitment))
        // Accounts
        .route("/api/accounts/:party", get(get_account))
        .route("/api/accounts/:party/deposit", post(deposit))
        .route("/api/ledger", get(list_ledger))
        // System
        .route("/api/config", get(get_config))
        .route("/api/system/tick", post(tick))
        .route("/api/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
