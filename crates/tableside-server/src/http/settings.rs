use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use tableside_api::ApiError;
use tableside_db::settings::{self, ReservationSettingsUpdate};

use crate::http::{object_body, value_as_bool};
use crate::state::AppState;

pub async fn list_handler(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let items = state.with_db(settings::list_settings).await?;
    Ok(Json(json!(items)))
}

pub async fn reservations_get_handler(
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let view = state.with_db(settings::reservation_settings).await?;
    Ok(Json(json!(view)))
}

pub async fn reservations_put_handler(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let body = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let map = body.as_object().cloned().unwrap_or_default();

    let update = ReservationSettingsUpdate {
        require_approval: map.get("RequireApproval").and_then(value_as_bool),
        reservation_interval_minutes: map
            .get("ReservationIntervalMinutes")
            .and_then(Value::as_i64),
        open_from: map
            .get("OpenFrom")
            .and_then(Value::as_str)
            .map(str::to_string),
        close_to: map
            .get("CloseTo")
            .and_then(Value::as_str)
            .map(str::to_string),
    };
    state
        .with_db(|conn| settings::update_reservation_settings(conn, &update))
        .await?;
    Ok(Json(json!({"status": "ok"})))
}

/// `PATCH /settings/bulk`: raw key/value writes.
pub async fn bulk_patch_handler(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let body = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let map = object_body(&body)?.clone();

    state
        .with_db(|conn| {
            for (key, value) in &map {
                let rendered = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                settings::set_value(conn, key, &rendered, None, None)?;
            }
            Ok(())
        })
        .await?;
    Ok(Json(json!({"status": "ok"})))
}

pub async fn admin_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "AdminLogin": state.config.admin_login,
        "AdminPassword": state.config.admin_password,
    }))
}
