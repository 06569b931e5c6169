use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use tableside_api::ApiError;
use tableside_db::stock;

use crate::http::{f64_field, str_field};
use crate::state::AppState;

pub async fn list_handler(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let items = state.with_db(stock::list_stock).await?;
    Ok(Json(json!(items)))
}

pub async fn create_handler(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let body = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let map = body.as_object().cloned().unwrap_or_default();

    let name = str_field(&map, &["Name"]).map(str::trim).filter(|s| !s.is_empty());
    let unit = str_field(&map, &["Unit"]).map(str::trim).filter(|s| !s.is_empty());
    let (Some(name), Some(unit)) = (name, unit) else {
        return Err(ApiError::validation("Missing Name or Unit"));
    };

    let qty = if map.contains_key("Qty") {
        f64_field(&map, "Qty").ok_or_else(|| ApiError::validation("Invalid Qty"))?
    } else {
        0.0
    };

    let id = state
        .with_db(|conn| stock::create_stock_item(conn, name, unit, qty))
        .await?;
    Ok((StatusCode::CREATED, Json(json!({"Id": id}))))
}

pub async fn patch_handler(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let body = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let map = body.as_object().cloned().unwrap_or_default();

    let name = map.get("Name").and_then(Value::as_str);
    let unit = map.get("Unit").and_then(Value::as_str);
    let qty = if map.contains_key("Qty") {
        Some(f64_field(&map, "Qty").ok_or_else(|| ApiError::validation("Invalid Qty"))?)
    } else {
        None
    };

    state
        .with_db(|conn| stock::patch_stock_item(conn, item_id, name, unit, qty))
        .await?;
    Ok(Json(json!({"status": "ok"})))
}

pub async fn adjust_handler(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let body = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let map = body.as_object().cloned().unwrap_or_default();

    let delta = if map.contains_key("Delta") {
        f64_field(&map, "Delta").ok_or_else(|| ApiError::validation("Invalid Delta"))?
    } else {
        0.0
    };

    let new_qty = state
        .with_db(|conn| stock::adjust_stock(conn, item_id, delta))
        .await?;
    Ok(Json(json!({"status": "ok", "NewQty": new_qty})))
}
