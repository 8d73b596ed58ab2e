//! Cleanup routes: the operations a cron trigger invokes over HTTP.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::Json;
use domains::AppError;
use secrecy::ExposeSecret;
use serde_json::{json, Value};

use super::error::ApiError;
use super::AppState;

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let Some(expected) = &state.cleanup_token else {
        return Ok(());
    };
    let provided = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    match provided {
        Some(token) if token == expected.expose_secret() => Ok(()),
        _ => Err(AppError::Unauthorized("invalid cleanup token".into())),
    }
}

pub async fn run_banners(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    authorize(&state, &headers)?;
    let report = state.cleanup.run().await?;
    Ok(Json(json!({
        "message": "cleanup finished",
        "policy": state.cleanup.policy(),
        "deleted": report.deleted,
        "errors": report.errors,
        "skipped": report.skipped,
    })))
}

pub async fn run_flyers(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    authorize(&state, &headers)?;
    let report = state.flyers.sweep().await?;
    Ok(Json(json!({
        "message": "flyer cleanup finished",
        "deleted": report.deleted,
        "errors": report.errors,
        "skipped": report.skipped,
    })))
}
