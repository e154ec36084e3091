//! HTTP mapping of protocol errors.

use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rpsls_core::{GameError, SettlementError};

/// Application error type
#[derive(Debug)]
pub enum AppError {
    Game(GameError),
    MissingCaller,
    ClockNotSimulated,
}

/// JSON body extractor whose rejections use the API error format
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Game(GameError::InvalidInput(rejection.body_text()))
    }
}

impl From<GameError> for AppError {
    fn from(err: GameError) -> Self {
        AppError::Game(err)
    }
}

impl From<SettlementError> for AppError {
    fn from(err: SettlementError) -> Self {
        AppError::Game(err.into())
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Game(err) => match err {
                GameError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                GameError::GuardViolation(_) => StatusCode::CONFLICT,
                GameError::CommitmentMismatch => StatusCode::UNPROCESSABLE_ENTITY,
                GameError::TimeoutNotYetEligible { .. } => StatusCode::PRECONDITION_FAILED,
                GameError::NotFound(_) => StatusCode::NOT_FOUND,
                GameError::Settlement(SettlementError::InsufficientFunds { .. }) => {
                    StatusCode::PAYMENT_REQUIRED
                }
                GameError::Settlement(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::MissingCaller => StatusCode::UNAUTHORIZED,
            AppError::ClockNotSimulated => StatusCode::BAD_REQUEST,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            AppError::Game(err) => err.kind().as_str(),
            AppError::MissingCaller => "unauthorized",
            AppError::ClockNotSimulated => "clock_not_simulated",
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::Game(err) => err.to_string(),
            AppError::MissingCaller => "Missing X-Party-Id header".to_string(),
            AppError::ClockNotSimulated => {
                "Time can only be advanced when RPSLS_SIMULATED_CLOCK is enabled".to_string()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.kind(),
            "message": self.message(),
        });
        (self.status(), Json(body)).into_response()
    }
}
