//! HTTP API handlers.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Duration, Utc};
use rpsls_core::{
    crypto::{Commitment, Salt, COMMITMENT_LAYOUT},
    GameError, GameId, GameService, GameView, LedgerEntry, Move, PartyId, Payout, Resolution,
    Settlement,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiJson, AppError};
use crate::state::AppState;

pub const CALLER_HEADER: &str = "X-Party-Id";

type ApiResult<T> = Result<T, AppError>;

// ============ Request/Response types ============

#[derive(Deserialize)]
pub struct CreateGameRequest {
    pub opponent: String,
    pub stake: u64,
    pub commitment: String,
}

#[derive(Serialize)]
pub struct CreateGameResponse {
    pub game_id: GameId,
    pub creator: PartyId,
    pub opponent: PartyId,
    pub stake: u64,
}

#[derive(Deserialize)]
pub struct PlayRequest {
    #[serde(rename = "move")]
    pub mv: String,
    pub amount: u64,
}

#[derive(Deserialize)]
pub struct RevealRequest {
    #[serde(rename = "move")]
    pub mv: String,
    pub salt: String,
}

#[derive(Serialize)]
pub struct PayoutResponse {
    pub game_id: GameId,
    pub payout: Payout,
}

#[derive(Deserialize)]
pub struct CommitmentRequest {
    #[serde(rename = "move")]
    pub mv: String,
    /// Fresh salt is generated when omitted
    pub salt: Option<String>,
}

#[derive(Serialize)]
pub struct CommitmentResponse {
    pub commitment: Commitment,
    pub salt: Salt,
    pub layout: &'static str,
}

#[derive(Deserialize)]
pub struct DepositRequest {
    pub amount: u64,
}

#[derive(Serialize)]
pub struct AccountResponse {
    pub party: PartyId,
    pub balance: u64,
}

#[derive(Serialize)]
pub struct ConfigResponse {
    pub timeout_secs: i64,
    pub simulated_clock: bool,
    pub commitment_layout: &'static str,
}

#[derive(Deserialize)]
pub struct TickRequest {
    pub seconds: i64,
}

#[derive(Serialize)]
pub struct TickResponse {
    pub now: DateTime<Utc>,
}

// ============ Extraction helpers ============

fn caller_from_header(headers: &HeaderMap) -> ApiResult<PartyId> {
    let raw = headers
        .get(CALLER_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::MissingCaller)?;
    Ok(raw.parse()?)
}

fn game_id(raw: &str) -> ApiResult<GameId> {
    Ok(raw.parse()?)
}

fn parse_move(raw: &str) -> ApiResult<Move> {
    Ok(raw.parse()?)
}

// ============ Game handlers ============

pub async fn create_game(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<CreateGameRequest>,
) -> ApiResult<impl IntoResponse> {
    let creator = caller_from_header(&headers)?;
    let opponent: PartyId = req.opponent.parse()?;
    let commitment: Commitment = req.commitment.parse()?;

    let game_id = state
        .service()
        .create_game(creator.clone(), opponent.clone(), req.stake, commitment)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateGameResponse {
            game_id,
            creator,
            opponent,
            stake: req.stake,
        }),
    ))
}

pub async fn get_game(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<GameView>> {
    let id = game_id(&id)?;
    Ok(Json(state.service().get_game_state(id).await?))
}

pub async fn play_move(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<PlayRequest>,
) -> ApiResult<Json<GameView>> {
    let id = game_id(&id)?;
    let caller = caller_from_header(&headers)?;
    let mv = parse_move(&req.mv)?;

    state
        .service()
        .play_move(id, &caller, mv, req.amount)
        .await?;
    Ok(Json(state.service().get_game_state(id).await?))
}

pub async fn reveal_move(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<RevealRequest>,
) -> ApiResult<Json<Resolution>> {
    let id = game_id(&id)?;
    let caller = caller_from_header(&headers)?;
    let mv = parse_move(&req.mv)?;
    let salt: Salt = req.salt.parse()?;

    let resolution = state.service().reveal_move(id, &caller, mv, &salt).await?;
    Ok(Json(resolution))
}

pub async fn claim_creator_timeout(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PayoutResponse>> {
    let game_id = game_id(&id)?;
    let payout = state.service().claim_creator_timeout(game_id).await?;
    Ok(Json(PayoutResponse { game_id, payout }))
}

pub async fn claim_opponent_timeout(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PayoutResponse>> {
    let game_id = game_id(&id)?;
    let payout = state.service().claim_opponent_timeout(game_id).await?;
    Ok(Json(PayoutResponse { game_id, payout }))
}

/// Client-side helper: hash a move under a caller-held or fresh salt
pub async fn compute_commitment(
    ApiJson(req): ApiJson<CommitmentRequest>,
) -> ApiResult<Json<CommitmentResponse>> {
    let mv = parse_move(&req.mv)?;
    let salt = match req.salt {
        Some(raw) => raw.parse::<Salt>()?,
        None => GameService::generate_secret(),
    };
    let commitment = GameService::compute_commitment(mv, &salt)?;

    Ok(Json(CommitmentResponse {
        commitment,
        salt,
        layout: COMMITMENT_LAYOUT,
    }))
}

// ============ Account handlers ============

pub async fn deposit(
    State(state): State<AppState>,
    Path(party): Path<String>,
    ApiJson(req): ApiJson<DepositRequest>,
) -> ApiResult<Json<AccountResponse>> {
    let party: PartyId = party.parse()?;
    if req.amount == 0 {
        return Err(GameError::InvalidInput("deposit amount must be positive".to_string()).into());
    }
    let balance = state.ledger().deposit(&party, req.amount)?;
    info!(%party, amount = req.amount, balance, "Deposit");
    Ok(Json(AccountResponse { party, balance }))
}

pub async fn get_account(
    State(state): State<AppState>,
    Path(party): Path<String>,
) -> ApiResult<Json<AccountResponse>> {
    let party: PartyId = party.parse()?;
    let balance = state.ledger().balance(&party).await?;
    Ok(Json(AccountResponse { party, balance }))
}

pub async fn list_ledger(State(state): State<AppState>) -> Json<Vec<LedgerEntry>> {
    Json(state.ledger().journal())
}

// ============ System handlers ============

pub async fn get_config(State(state): State<AppState>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        timeout_secs: state.service().config().timeout_window.num_seconds(),
        simulated_clock: state.manual_clock().is_some(),
        commitment_layout: COMMITMENT_LAYOUT,
    })
}

/// Advance simulated time
pub async fn tick(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<TickRequest>,
) -> ApiResult<Json<TickResponse>> {
    let clock = state.manual_clock().ok_or(AppError::ClockNotSimulated)?;
    if req.seconds <= 0 {
        return Err(GameError::InvalidInput("seconds must be positive".to_string()).into());
    }
    let by = Duration::try_seconds(req.seconds).ok_or_else(|| {
        GameError::InvalidInput(format!("cannot advance clock by {}s", req.seconds))
    })?;
    let now = clock.advance(by)?;
    info!(seconds = req.seconds, %now, "Clock advanced");
    Ok(Json(TickResponse { now }))
}

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}
