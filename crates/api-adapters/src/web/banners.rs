//! Banner carousel handlers.

use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use bytes::Bytes;
use chrono::Utc;
use domains::{AppError, DayRule};
use mime::Mime;
use serde_json::{json, Value};
use services::clock;

use super::dto::{
    parse_optional_day, parse_ordered_urls, required_url, EnableBody, UpdateDayBody, UrlBody,
    UrlQuery,
};
use super::error::ApiError;
use super::AppState;

fn bad_multipart(err: MultipartError) -> ApiError {
    AppError::Validation(format!("malformed multipart body: {err}")).into()
}

/// Pulls the `file` field (bytes + content type) and an optional `day` tag
/// out of an upload form. Non-image payloads are rejected here.
pub(super) async fn read_upload(
    mut multipart: Multipart,
) -> Result<(Bytes, Mime, Option<DayRule>), ApiError> {
    let mut file = None;
    let mut day = None;
    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        match field.name().unwrap_or_default() {
            "file" => {
                let content_type = field
                    .content_type()
                    .and_then(|ct| ct.parse::<Mime>().ok())
                    .unwrap_or(mime::APPLICATION_OCTET_STREAM);
                let data = field.bytes().await.map_err(bad_multipart)?;
                file = Some((data, content_type));
            }
            "day" => {
                let text = field.text().await.map_err(bad_multipart)?;
                if !text.is_empty() {
                    day = Some(text.parse::<DayRule>()?);
                }
            }
            _ => {}
        }
    }
    let (data, content_type) =
        file.ok_or_else(|| AppError::Validation("file field is required".into()))?;
    if content_type.type_() != mime::IMAGE {
        return Err(AppError::Validation(format!(
            "unsupported content type: {content_type}"
        ))
        .into());
    }
    Ok((data, content_type, day))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let (data, content_type, day) = read_upload(multipart).await?;
    let banner = state.banners.create(data, content_type, day).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "banner created",
            "url": banner.url,
            "day": banner.day,
            "position": banner.position,
        })),
    ))
}

/// Public endpoint: only the banners eligible today, today being whatever
/// the display-region calendar says.
pub async fn list_displayable(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let today = clock::display_date(Utc::now());
    let banners = state.banners.list_displayable(today).await?;
    let urls: Vec<&str> = banners.iter().map(|b| b.url.as_str()).collect();
    Ok(Json(json!({
        "message": "active banners",
        "banners": urls,
        "day": clock::weekday_tag(today),
    })))
}

pub async fn list_all(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let banners = state.banners.list_active().await?;
    Ok(Json(json!({ "message": "all active banners", "banners": banners })))
}

pub async fn list_disabled(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let banners = state.banners.list_disabled().await?;
    Ok(Json(json!({ "message": "disabled banners", "banners": banners })))
}

pub async fn disable(
    State(state): State<Arc<AppState>>,
    Json(body): Json<UrlBody>,
) -> Result<Json<Value>, ApiError> {
    let url = required_url(body.url)?;
    state.banners.disable(&url).await?;
    Ok(Json(json!({ "message": "banner disabled", "url": url })))
}

pub async fn enable(
    State(state): State<Arc<AppState>>,
    Json(body): Json<EnableBody>,
) -> Result<Json<Value>, ApiError> {
    let url = required_url(body.url)?;
    let day = parse_optional_day(body.day.as_deref())?;
    let position = state.banners.enable(&url, day).await?;
    Ok(Json(json!({
        "message": "banner enabled",
        "url": url,
        "position": position,
    })))
}

pub async fn update_day(
    State(state): State<Arc<AppState>>,
    Json(body): Json<UpdateDayBody>,
) -> Result<Json<Value>, ApiError> {
    let url = required_url(body.url)?;
    let day: DayRule = body
        .day
        .as_deref()
        .ok_or_else(|| AppError::Validation("day is required".into()))?
        .parse()?;
    state.banners.update_day(&url, day).await?;
    Ok(Json(json!({
        "message": "banner day updated",
        "url": url,
        "day": day,
    })))
}

pub async fn reorder(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let urls = parse_ordered_urls(&body)?;
    let updated = state.banners.reorder(&urls).await?;
    Ok(Json(json!({ "message": "banner order merged", "updated": updated })))
}

pub async fn replace_order(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let urls = parse_ordered_urls(&body)?;
    let updated = state.banners.replace_order(&urls).await?;
    Ok(Json(json!({ "message": "banner order replaced", "updated": updated })))
}

/// Accepts the url in the JSON body or as a query parameter, the way the
/// dashboard's delete calls arrive.
pub async fn destroy(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UrlQuery>,
    body: Option<Json<UrlBody>>,
) -> Result<Json<Value>, ApiError> {
    let url = required_url(body.and_then(|Json(b)| b.url).or(query.url))?;
    let outcome = state.banners.destroy(&url).await?;
    Ok(Json(json!({
        "message": "banner removed",
        "removed": outcome.removed,
        "media_status": outcome.media,
    })))
}
