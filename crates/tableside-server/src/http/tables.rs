use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

use tableside_api::ApiError;
use tableside_db::{tables, zones};
use tableside_model::{TableGroup, TableNode};

use crate::http::{array_body, i64_field};
use crate::state::AppState;

pub async fn list_handler(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let nodes = state.with_db(tables::list_tables).await?;
    Ok(Json(json!(nodes)))
}

pub async fn sync_handler(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let body = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let mut items: Vec<TableNode> = array_body(body)?;
    for item in &mut items {
        if item.level < 1 {
            item.level = 1;
        }
    }
    let count = state
        .with_db(|conn| tables::sync_tables(conn, &items))
        .await?;
    Ok(Json(json!({"status": "ok", "count": count})))
}

pub async fn patch_handler(
    State(state): State<AppState>,
    Path(table_id): Path<i64>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let body = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let map = body.as_object().cloned().unwrap_or_default();

    if !map.contains_key("Ile_osob") {
        return Err(ApiError::validation("Missing field Ile_osob"));
    }
    let seats = i64_field(&map, "Ile_osob").unwrap_or(-1);
    if !(1..=50).contains(&seats) {
        return Err(ApiError::validation("Ile_osob out of range"));
    }

    state
        .with_db(|conn| tables::patch_table_seats(conn, table_id, seats))
        .await?;
    Ok(Json(json!({"status": "ok", "Id": table_id, "Ile_osob": seats})))
}

pub async fn groups_list_handler(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let groups = state.with_db(zones::list_table_groups).await?;
    Ok(Json(json!(groups)))
}

pub async fn groups_sync_handler(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let body = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let groups: Vec<TableGroup> = array_body(body)?;
    let count = state
        .with_db(|conn| zones::sync_table_groups(conn, &groups))
        .await?;
    Ok(Json(json!({"status": "ok", "groups": count})))
}
