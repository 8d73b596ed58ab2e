//! Request bodies and their field-presence validation.
//!
//! Fields are optional at the serde layer so a missing value surfaces as a
//! 400 from our own validation, before any store call.

use domains::{AppError, DayRule};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct UrlBody {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EnableBody {
    pub url: Option<String>,
    pub day: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDayBody {
    pub url: Option<String>,
    pub day: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UrlQuery {
    pub url: Option<String>,
}

pub fn required_url(url: Option<String>) -> Result<String, AppError> {
    url.filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::Validation("url is required".into()))
}

pub fn parse_optional_day(day: Option<&str>) -> Result<Option<DayRule>, AppError> {
    day.filter(|d| !d.is_empty())
        .map(str::parse::<DayRule>)
        .transpose()
}

/// The reorder bodies are validated by hand so a non-list payload comes back
/// as a 400 instead of a serde rejection.
pub fn parse_ordered_urls(body: &Value) -> Result<Vec<String>, AppError> {
    let list = body
        .get("ordered_urls")
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::Validation("ordered_urls must be a list".into()))?;
    list.iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| AppError::Validation("ordered_urls must contain urls".into()))
        })
        .collect()
}
