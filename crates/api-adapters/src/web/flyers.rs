//! Flyer ("encarte") handlers.

use std::sync::Arc;

use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

use super::banners::read_upload;
use super::dto::{required_url, UrlBody, UrlQuery};
use super::error::ApiError;
use super::AppState;

pub async fn create(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    // flyers carry no day rule; a day field is parsed but discarded
    let (data, content_type, _day) = read_upload(multipart).await?;
    let url = state.flyers.add(data, content_type, Utc::now()).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "flyer added", "url": url })),
    ))
}

pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let flyers = state.flyers.list().await?;
    Ok(Json(json!({ "message": "current flyers", "encartes": flyers })))
}

pub async fn destroy(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UrlQuery>,
    body: Option<Json<UrlBody>>,
) -> Result<Json<Value>, ApiError> {
    let url = required_url(body.and_then(|Json(b)| b.url).or(query.url))?;
    let outcome = state.flyers.destroy(&url).await?;
    Ok(Json(json!({
        "message": "flyer removed",
        "removed": outcome.removed,
        "media_status": outcome.media,
    })))
}
