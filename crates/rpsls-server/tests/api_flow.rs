//! HTTP-level tests for the settlement API.
//!
//! Run with: cargo test -p rpsls-server --test api_flow

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use rpsls_server::{router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Drives the router in-process, optionally acting as a party
struct ApiClient {
    app: Router,
    party: Option<String>,
}

impl ApiClient {
    fn new() -> Self {
        Self {
            app: router(AppState::simulated()),
            party: None,
        }
    }

    fn with_party(&self, party: &str) -> Self {
        Self {
            app: self.app.clone(),
            party: Some(party.to_string()),
        }
    }

    async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(party) = &self.party {
            builder = builder.header("X-Party-Id", party);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send("GET", uri, None).await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send("POST", uri, Some(body)).await
    }

    async fn fund(&self, party: &str, amount: u64) {
        let (status, _) = self
            .post(
                &format!("/api/accounts/{}/deposit", party),
                json!({ "amount": amount }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    async fn balance(&self, party: &str) -> u64 {
        let (_, body) = self.get(&format!("/api/accounts/{}", party)).await;
        body["balance"].as_u64().unwrap()
    }

    async fn commitment(&self, mv: &str, salt: &str) -> String {
        let (status, body) = self
            .post("/api/commitment", json!({ "move": mv, "salt": salt }))
            .await;
        assert_eq!(status, StatusCode::OK);
        body["commitment"].as_str().unwrap().to_string()
    }

    /// alice commits `mv` against bob
    async fn create_game(&self, mv: &str, salt: &str, stake: u64) -> String {
        let commitment = self.commitment(mv, salt).await;
        let (status, body) = self
            .with_party("alice")
            .post(
                "/api/games",
                json!({ "opponent": "bob", "stake": stake, "commitment": commitment }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["game_id"].as_str().unwrap().to_string()
    }
}

async fn funded() -> ApiClient {
    let api = ApiClient::new();
    api.fund("alice", 1000).await;
    api.fund("bob", 1000).await;
    api
}

#[tokio::test]
async fn test_health() {
    let api = ApiClient::new();
    let (status, body) = api.get("/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_full_game_creator_wins() {
    let api = funded().await;
    let id = api.create_game("rock", "0x5eed", 100).await;
    assert_eq!(api.balance("alice").await, 900);

    let (status, view) = api
        .with_party("bob")
        .post(
            &format!("/api/games/{}/play", id),
            json!({ "move": "scissors", "amount": 100 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["status"], "awaiting_reveal");
    assert_eq!(view["pooled"], 200);

    let (status, resolution) = api
        .with_party("alice")
        .post(
            &format!("/api/games/{}/reveal", id),
            json!({ "move": "rock", "salt": "0x5eed" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resolution["outcome"], "creator_wins");
    assert_eq!(resolution["payout"]["creator"], 200);

    assert_eq!(api.balance("alice").await, 1100);
    assert_eq!(api.balance("bob").await, 900);

    let (_, view) = api.get(&format!("/api/games/{}", id)).await;
    assert_eq!(view["status"], "resolved");
    assert_eq!(view["pooled"], 0);
}

#[tokio::test]
async fn test_error_statuses() {
    let api = funded().await;
    let id = api.create_game("paper", "0x01", 100).await;

    // No caller header
    let (status, body) = api
        .post(
            &format!("/api/games/{}/play", id),
            json!({ "move": "rock", "amount": 100 }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let bob = api.with_party("bob");
    let (status, body) = bob
        .post(
            &format!("/api/games/{}/play", id),
            json!({ "move": "none", "amount": 100 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");

    let (status, body) = bob
        .post(
            &format!("/api/games/{}/play", id),
            json!({ "move": "rock", "amount": 99 }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "guard_violation");

    let (status, _) = api.get("/api/games/not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = api
        .get("/api/games/00000000-0000-0000-0000-000000000000")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, _) = api
        .with_party("alice")
        .post(&format!("/api/games/{}/timeout/creator", id), json!({}))
        .await;
    assert_eq!(status, StatusCode::PRECONDITION_FAILED);
}

#[tokio::test]
async fn test_wrong_salt_is_unprocessable() {
    let api = funded().await;
    let id = api.create_game("spock", "0xabc", 100).await;
    api.with_party("bob")
        .post(
            &format!("/api/games/{}/play", id),
            json!({ "move": "lizard", "amount": 100 }),
        )
        .await;

    let (status, body) = api
        .with_party("alice")
        .post(
            &format!("/api/games/{}/reveal", id),
            json!({ "move": "spock", "salt": "0xabd" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "commitment_mismatch");
}

#[tokio::test]
async fn test_insufficient_funds() {
    let api = ApiClient::new();
    api.fund("alice", 10).await;
    let commitment = api.commitment("rock", "0x1").await;

    let (status, body) = api
        .with_party("alice")
        .post(
            "/api/games",
            json!({ "opponent": "bob", "stake": 100, "commitment": commitment }),
        )
        .await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body["error"], "settlement");
    assert_eq!(api.balance("alice").await, 10);
}

#[tokio::test]
async fn test_opponent_timeout_after_tick() {
    let api = funded().await;
    let id = api.create_game("rock", "0x77", 100).await;
    api.with_party("bob")
        .post(
            &format!("/api/games/{}/play", id),
            json!({ "move": "paper", "amount": 100 }),
        )
        .await;

    let uri = format!("/api/games/{}/timeout/opponent", id);
    let (status, _) = api.post(&uri, json!({})).await;
    assert_eq!(status, StatusCode::PRECONDITION_FAILED);

    let (status, _) = api.post("/api/system/tick", json!({ "seconds": 300 })).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = api.post(&uri, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payout"]["opponent"], 200);
    assert_eq!(api.balance("bob").await, 1100);

    let (status, _) = api.post(&uri, json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, journal) = api.get("/api/ledger").await;
    let kinds: Vec<&str> = journal
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["kind"].as_str().unwrap())
        .collect();
    assert_eq!(
        kinds,
        ["deposit", "deposit", "escrow", "escrow", "release"]
    );
}

#[tokio::test]
async fn test_commitment_helper_generates_salt() {
    let api = ApiClient::new();
    let (status, body) = api.post("/api/commitment", json!({ "move": "lizard" })).await;
    assert_eq!(status, StatusCode::OK);
    let salt = body["salt"].as_str().unwrap().to_string();
    assert!(salt.starts_with("0x"));

    let again = api.commitment("lizard", &salt).await;
    assert_eq!(body["commitment"].as_str().unwrap(), again);

    let (status, _) = api.post("/api/commitment", json!({ "move": "none" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_config_reports_timeout() {
    let api = ApiClient::new();
    let (status, body) = api.get("/api/config").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timeout_secs"], 300);
    assert_eq!(body["simulated_clock"], true);
}

#[tokio::test]
async fn test_malformed_body_is_invalid_input() {
    let api = funded().await;
    let commitment = api.commitment("rock", "0x2").await;

    let (status, body) = api
        .with_party("alice")
        .post(
            "/api/games",
            json!({ "opponent": "bob", "stake": -5, "commitment": commitment }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");
    assert!(body["message"].as_str().unwrap().contains("stake"));

    let (status, body) = api
        .with_party("bob")
        .send("POST", "/api/accounts/bob/deposit", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");
    assert_eq!(api.balance("alice").await, 1000);
}

#[tokio::test]
async fn test_out_of_range_tick_is_rejected() {
    let api = ApiClient::new();
    let (_, before) = api.post("/api/system/tick", json!({ "seconds": 1 })).await;

    for seconds in [i64::MAX, 10_000_000_000_000] {
        let (status, body) = api
            .post("/api/system/tick", json!({ "seconds": seconds }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_input");
    }

    let (status, after) = api.post("/api/system/tick", json!({ "seconds": 1 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(before["now"], after["now"]);
}
