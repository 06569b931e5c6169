use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

use tableside_api::ApiError;
use tableside_db::reservations;
use tableside_model::Reservation;

use crate::http::{array_body, value_as_bool};
use crate::state::AppState;

pub async fn list_handler(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let items = state.with_db(reservations::list_reservations).await?;
    Ok(Json(json!(items)))
}

pub async fn sync_handler(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let body = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let items: Vec<Reservation> = array_body(body)?;
    let count = state
        .with_db(|conn| reservations::sync_reservations(conn, &items))
        .await?;
    Ok(Json(json!({"status": "ok", "count": count})))
}

pub async fn approved_handler(
    State(state): State<AppState>,
    Path(reservation_id): Path<i64>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let body = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let map = body.as_object().cloned().unwrap_or_default();

    let Some(raw) = map.get("Approved") else {
        return Err(ApiError::validation("Missing field 'Approved' (bool)"));
    };
    let Some(approved) = value_as_bool(raw) else {
        return Err(ApiError::validation("Field 'Approved' must be boolean"));
    };

    state
        .with_db(|conn| reservations::set_reservation_approved(conn, reservation_id, approved))
        .await?;
    Ok(Json(json!({
        "status": "ok",
        "Id": reservation_id,
        "Approved": approved,
    })))
}
