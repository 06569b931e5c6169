use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use tableside_api::ApiError;
use tableside_model::ReportDate;

pub mod login;
pub mod menu;
pub mod orders;
pub mod raports;
pub mod reservations;
pub mod settings;
pub mod staff;
pub mod stock;
pub mod tables;

/// Body helpers shared by the handlers. Clients send loosely-shaped JSON;
/// these mirror the tolerant access the desktop client has always relied on.

pub(crate) fn object_body(body: &Value) -> Result<&Map<String, Value>, ApiError> {
    body.as_object()
        .ok_or_else(|| ApiError::validation("Expected JSON object"))
}

pub(crate) fn array_body<T: DeserializeOwned>(body: Value) -> Result<Vec<T>, ApiError> {
    if !body.is_array() {
        return Err(ApiError::validation("Expected a JSON array"));
    }
    serde_json::from_value(body).map_err(|e| ApiError::validation(e.to_string()))
}

/// First non-empty string under any of the given keys.
pub(crate) fn str_field<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| map.get(*k))
        .filter_map(Value::as_str)
        .find(|s| !s.is_empty())
}

pub(crate) fn i64_field(map: &Map<String, Value>, key: &str) -> Option<i64> {
    map.get(key).and_then(value_as_i64)
}

pub(crate) fn f64_field(map: &Map<String, Value>, key: &str) -> Option<f64> {
    map.get(key).and_then(|v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Truthiness the desktop client uses for flags: bool, number, or a word.
pub(crate) fn value_as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => Some(matches!(
            s.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "y" | "tak"
        )),
        _ => None,
    }
}

/// Required `date=YYYY-MM-DD` query parameter.
pub(crate) fn required_date_param(
    params: &HashMap<String, String>,
) -> Result<ReportDate, ApiError> {
    let raw = params
        .get("date")
        .map(String::as_str)
        .unwrap_or_default()
        .trim();
    if raw.is_empty() {
        return Err(ApiError::validation("Missing query param: date=YYYY-MM-DD"));
    }
    Ok(ReportDate::parse(raw)?)
}

/// Date param that tolerates trailing time components and defaults to today.
pub(crate) fn day_param_or_today(
    params: &HashMap<String, String>,
) -> Result<ReportDate, ApiError> {
    let raw = params
        .get("date")
        .map(String::as_str)
        .unwrap_or_default()
        .trim();
    if raw.is_empty() {
        return Ok(ReportDate::today());
    }
    let clipped = raw.get(..10).unwrap_or(raw);
    Ok(ReportDate::parse(clipped)?)
}
