//! HTTP server for webhook ingress.
//!
//! `POST /webhook` receives Telegram updates and queues them for the gateway
//! loop; `GET /health` reports uptime and engine counters. Spawned by the
//! gateway only when `[webhook].enabled` is set.

use crate::gateway::{lock_engine, SharedEngine};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::time::Instant;
use suitcast_channels::telegram::{parse_update, types::TgUpdate};
use suitcast_core::{config::WebhookConfig, message::InboundUpdate};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Header Telegram echoes back with the secret given to `setWebhook`.
pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

type ApiError = (StatusCode, Json<Value>);

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    tx: mpsc::Sender<InboundUpdate>,
    secret_token: Option<String>,
    engine: SharedEngine,
    uptime: Instant,
}

impl ApiState {
    pub fn new(
        tx: mpsc::Sender<InboundUpdate>,
        secret_token: &str,
        engine: SharedEngine,
        uptime: Instant,
    ) -> Self {
        let secret_token = if secret_token.is_empty() {
            None
        } else {
            Some(secret_token.to_string())
        };
        Self {
            tx,
            secret_token,
            engine,
            uptime,
        }
    }
}

/// Constant-time string comparison for the webhook secret.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// Check the secret header. Returns `None` if authorized.
fn check_secret(headers: &HeaderMap, secret: &Option<String>) -> Option<ApiError> {
    let expected = secret.as_ref()?;

    let Some(value) = headers.get(SECRET_HEADER) else {
        return Some((
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "missing secret token"})),
        ));
    };

    match value.to_str() {
        Ok(token) if constant_time_eq(token, expected) => None,
        _ => Some((
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "invalid secret token"})),
        )),
    }
}

/// `GET /health`: uptime and prediction counters.
async fn health(State(state): State<ApiState>) -> Json<Value> {
    let (tracked, pending) = {
        let engine = lock_engine(&state.engine);
        (engine.store().len(), engine.store().pending_count())
    };
    Json(json!({
        "status": "ok",
        "uptime_secs": state.uptime.elapsed().as_secs(),
        "predictions": tracked,
        "pending": pending,
    }))
}

/// `POST /webhook`: accept one Telegram update.
async fn webhook(
    headers: HeaderMap,
    State(state): State<ApiState>,
    body: Result<Json<TgUpdate>, axum::extract::rejection::JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    if let Some(err) = check_secret(&headers, &state.secret_token) {
        warn!("webhook request rejected: bad secret");
        return Err(err);
    }

    let Json(update) = body.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": format!("invalid update: {e}")})),
        )
    })?;

    let update_id = update.update_id;
    let Some(inbound) = parse_update(update) else {
        debug!("webhook: skipping update {update_id} without text");
        return Ok(Json(json!({"status": "ignored"})));
    };

    state.tx.send(inbound).await.map_err(|_| {
        error!("webhook: gateway queue closed");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"error": "gateway unavailable"})),
        )
    })?;

    Ok(Json(json!({"status": "queued"})))
}

/// Build the axum router with shared state.
fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhook", post(webhook))
        .layer(axum::extract::DefaultBodyLimit::max(1024 * 1024))
        .with_state(state)
}

/// Start the webhook server. Called from `Gateway::run()`.
pub async fn serve(config: WebhookConfig, state: ApiState) {
    let app = build_router(state);
    let addr = format!("{}:{}", config.host, config.port);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("webhook server failed to bind to {addr}: {e}");
            return;
        }
    };

    info!("webhook server listening on {addr}");

    if let Err(e) = axum::serve(listener, app).await {
        error!("webhook server error: {e}");
    }
}
