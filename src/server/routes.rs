use super::AppState;
use super::error::ApiError;
use crate::analysis::MarketAnalysis;
use crate::auth::{AccessLevel, User};
use crate::models::{ChatRequest, MarketSnapshot, PriceUpdate};
use axum::{
    Json,
    body::Body,
    extract::{Path, State, rejection::JsonRejection},
    http::header,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{error, info, warn};

const CHAT_ERROR: &str = "An error occurred during your request.";

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn price(State(st): State<AppState>) -> Result<Json<PriceUpdate>, ApiError> {
    let source = st.price_source.as_ref().ok_or_else(|| {
        error!("[HTTP] price source not configured");
        let details = st
            .config
            .require_bitquery_token()
            .err()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "price source unavailable".into());
        ApiError::internal("Service configuration error", details)
    })?;

    match source.latest().await {
        Ok(update) => {
            info!(price = update.price, timestamp = update.timestamp, "[HTTP] price served");
            Ok(Json(update))
        }
        Err(e) => {
            warn!("[HTTP] price fetch failed: {e}");
            Err(ApiError::internal("Failed to fetch price data", e))
        }
    }
}

/// Relay a streamed completion to the caller without buffering it.
pub async fn chat(
    State(st): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = body.map_err(|e| {
        warn!("[CHAT] bad request body: {e}");
        ApiError::internal(CHAT_ERROR, e.body_text())
    })?;

    let upstream = st.chat.stream(&req.messages).await.map_err(|e| {
        error!("[CHAT] upstream failed: {e}");
        ApiError::internal(CHAT_ERROR, e)
    })?;
    info!(messages = req.messages.len(), "[CHAT] streaming completion");

    Ok((
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
        ],
        Body::from_stream(upstream.bytes_stream()),
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
pub struct Credentials {
    email: String,
    password: String,
}

#[derive(Serialize)]
pub struct UserBody {
    user: User,
}

pub async fn sign_in(
    State(st): State<AppState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<UserBody>, ApiError> {
    let Json(creds) = body?;
    let user = st.auth.sign_in(&creds.email, &creds.password).await?;
    info!(user = %user.id, "[HTTP] signed in");
    Ok(Json(UserBody { user }))
}

pub async fn sign_up(
    State(st): State<AppState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<UserBody>, ApiError> {
    let Json(creds) = body?;
    let user = st.auth.sign_up(&creds.email, &creds.password).await?;
    info!(user = %user.id, "[HTTP] signed up");
    Ok(Json(UserBody { user }))
}

#[derive(Debug, Serialize)]
pub struct AccessLevelView {
    level: AccessLevel,
    name: &'static str,
    description: &'static str,
}

pub async fn access_levels(
    State(st): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<Vec<AccessLevelView>> {
    let levels = st.auth.access_levels(&user_id).await;
    Json(
        levels
            .into_iter()
            .map(|level| AccessLevelView {
                level,
                name: level.name(),
                description: level.description(),
            })
            .collect(),
    )
}

pub async fn analysis(
    State(st): State<AppState>,
    body: Result<Json<MarketSnapshot>, JsonRejection>,
) -> Result<Json<MarketAnalysis>, ApiError> {
    let Json(snapshot) = body?;
    Ok(Json(st.analyst.analyze(&snapshot).await))
}
