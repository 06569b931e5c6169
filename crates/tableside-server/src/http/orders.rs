use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use tracing::info;

use tableside_api::ApiError;
use tableside_db::orders::{self, NewOrderItem};
use tableside_model::TableOrders;

use crate::http::{array_body, day_param_or_today, i64_field, str_field, value_as_bool};
use crate::state::AppState;

pub async fn list_handler(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let grouped = state.with_db(orders::list_orders).await?;
    Ok(Json(json!(grouped)))
}

pub async fn create_handler(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let body = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let map = body.as_object().cloned().unwrap_or_default();

    let table_id = i64_field(&map, "TableId").filter(|v| *v > 0);
    let waiter_id = i64_field(&map, "WaiterId").filter(|v| *v > 0);
    let items = map.get("Items").and_then(Value::as_array).cloned();
    let (Some(table_id), Some(waiter_id), Some(items)) = (table_id, waiter_id, items) else {
        return Err(ApiError::validation("Missing TableId / WaiterId / Items"));
    };
    if items.is_empty() {
        return Err(ApiError::validation("Missing TableId / WaiterId / Items"));
    }
    let notes = str_field(&map, &["Notes"]).unwrap_or("").to_string();

    let new_items: Vec<NewOrderItem> = items
        .iter()
        .filter_map(|item| {
            let map = item.as_object()?;
            let menu_id = i64_field(map, "MenuId")?;
            Some(NewOrderItem {
                menu_id,
                qty: i64_field(map, "Qty").unwrap_or(1),
            })
        })
        .collect();

    let order_id = state
        .with_db(|conn| orders::create_order(conn, table_id, waiter_id, &notes, &new_items))
        .await?;
    Ok((StatusCode::CREATED, Json(json!({"OrderId": order_id}))))
}

pub async fn add_item_handler(
    State(state): State<AppState>,
    Path(order_id): Path<i64>,
    body: Option<Json<Value>>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let body = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let map = body.as_object().cloned().unwrap_or_default();

    let name = str_field(&map, &["Name"]);
    let qty = i64_field(&map, "Qty").unwrap_or(1);
    let Some(name) = name else {
        return Err(ApiError::validation("Missing Name or invalid Qty"));
    };
    if qty <= 0 {
        return Err(ApiError::validation("Missing Name or invalid Qty"));
    }

    let added = state
        .with_db(|conn| orders::add_order_item(conn, order_id, name, qty))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "ItemId": added.item_id,
            "OrderId": added.order_id,
            "Name": added.name,
            "Qty": added.qty,
            "IsServed": false,
        })),
    ))
}

pub async fn update_item_handler(
    State(state): State<AppState>,
    Path((order_id, item_id)): Path<(i64, i64)>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let body = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let map = body.as_object().cloned().unwrap_or_default();

    let qty = match map.get("Qty") {
        Some(value) => {
            let qty = value.as_i64().unwrap_or(-1);
            if qty <= 0 {
                return Err(ApiError::validation("Qty must be > 0"));
            }
            Some(qty)
        }
        None => None,
    };
    let served = map.get("Served").and_then(value_as_bool);

    state
        .with_db(|conn| orders::update_order_item(conn, order_id, item_id, qty, served))
        .await?;
    Ok(Json(json!({"status": "ok"})))
}

pub async fn delete_item_handler(
    State(state): State<AppState>,
    Path((order_id, item_id)): Path<(i64, i64)>,
) -> Result<Json<Value>, ApiError> {
    state
        .with_db(|conn| orders::delete_order_item(conn, order_id, item_id))
        .await?;
    Ok(Json(json!({"status": "ok"})))
}

pub async fn status_handler(
    State(state): State<AppState>,
    Path(order_id): Path<i64>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let body = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let map = body.as_object().cloned().unwrap_or_default();

    let status = map.get("Status").and_then(Value::as_str).map(str::to_string);
    let set_all_served = map
        .get("SetAllServed")
        .and_then(value_as_bool)
        .unwrap_or(false);

    state
        .with_db(|conn| orders::update_order_status(conn, order_id, status.as_deref(), set_all_served))
        .await?;
    Ok(Json(json!({"status": "ok"})))
}

pub async fn delete_handler(
    State(state): State<AppState>,
    Path(order_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    state
        .with_db(|conn| orders::delete_order(conn, order_id))
        .await?;
    Ok(Json(json!({"status": "ok"})))
}

pub async fn sync_handler(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let body = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let payload: Vec<TableOrders> = array_body(body)?;
    let counts = state
        .with_db(|conn| orders::sync_orders(conn, &payload))
        .await?;
    info!(orders = counts.orders, positions = counts.positions, "orders synced");
    Ok(Json(json!({
        "status": "ok",
        "orders": counts.orders,
        "positions": counts.positions,
    })))
}

/// `GET /orders/closed?date=YYYY-MM-DD`: settled orders for one day.
pub async fn closed_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let date = day_param_or_today(&params)?;
    let grouped = state
        .with_db(|conn| orders::closed_orders_for_day(conn, date.as_naive()))
        .await?;
    Ok(Json(json!(grouped)))
}

/// `POST /orders/closed/purge?date=YYYY-MM-DD[&purge_report=1]`
///
/// Deletes that day's closed orders; with `purge_report=1` the archived
/// report file for the date goes too.
pub async fn purge_closed_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let raw = params.get("date").map(String::as_str).unwrap_or_default();
    if raw.trim().is_empty() {
        return Err(ApiError::validation("Missing ?date=YYYY-MM-DD"));
    }
    let date = day_param_or_today(&params)?;

    let counts = state
        .with_db(|conn| orders::purge_closed_for_day(conn, date.as_naive()))
        .await?;

    let purge_report = params
        .get("purge_report")
        .is_some_and(|v| matches!(v.as_str(), "1" | "true"));
    if purge_report {
        let removed = state.archive.remove_day(date)?;
        info!(date = %date, removed, "report purge requested");
    }

    Ok(Json(json!({
        "status": "ok",
        "date": date.iso(),
        "deleted_orders": counts.orders,
        "deleted_positions": counts.positions,
    })))
}
