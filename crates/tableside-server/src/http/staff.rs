use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use tableside_api::ApiError;
use tableside_db::staff::{self, StaffUpdate};
use tableside_model::StaffMember;

use crate::http::{array_body, str_field};
use crate::state::AppState;

pub async fn list_handler(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let rows = state.with_db(staff::list_staff).await?;
    Ok(Json(json!(rows)))
}

pub async fn create_handler(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let body = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let map = body.as_object().cloned().unwrap_or_default();

    let first = str_field(&map, &["FirstName"]);
    let last = str_field(&map, &["LastName"]);
    let phone = str_field(&map, &["Phone"]);
    let login = str_field(&map, &["Login"]);
    let pwd_hash = str_field(&map, &["PasswordHash"]);
    let (Some(first), Some(last), Some(phone), Some(login), Some(pwd_hash)) =
        (first, last, phone, login, pwd_hash)
    else {
        return Err(ApiError::validation("Missing fields"));
    };

    let id = state
        .with_db(|conn| staff::create_staff(conn, first, last, phone, login, pwd_hash))
        .await?;
    Ok((StatusCode::CREATED, Json(json!({"Id": id}))))
}

pub async fn update_handler(
    State(state): State<AppState>,
    Path(staff_id): Path<i64>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let body = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let map = body.as_object().cloned().unwrap_or_default();

    let update = StaffUpdate {
        first_name: map.get("FirstName").and_then(Value::as_str).map(str::to_string),
        last_name: map.get("LastName").and_then(Value::as_str).map(str::to_string),
        phone: map.get("Phone").and_then(Value::as_str).map(str::to_string),
        login: map.get("Login").and_then(Value::as_str).map(str::to_string),
        password_hash: map
            .get("PasswordHash")
            .and_then(Value::as_str)
            .map(str::to_string),
    };
    state
        .with_db(|conn| staff::update_staff(conn, staff_id, &update))
        .await?;
    Ok(Json(json!({"status": "ok"})))
}

pub async fn delete_handler(
    State(state): State<AppState>,
    Path(staff_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    state
        .with_db(|conn| staff::delete_staff(conn, staff_id))
        .await?;
    Ok(Json(json!({"status": "ok"})))
}

pub async fn sync_handler(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let body = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let items: Vec<StaffMember> = array_body(body)?;
    let stats = state.with_db(|conn| staff::sync_staff(conn, &items)).await?;
    Ok(Json(json!({
        "status": "ok",
        "new": stats.new,
        "updated": stats.updated,
        "total_from_json": stats.total,
    })))
}

pub async fn password_handler(
    State(state): State<AppState>,
    Path(staff_id): Path<i64>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let body = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let map = body.as_object().cloned().unwrap_or_default();

    let old_hash = str_field(&map, &["OldPasswordHash"]);
    let new_hash = str_field(&map, &["NewPasswordHash"]);
    let (Some(old_hash), Some(new_hash)) = (old_hash, new_hash) else {
        return Err(ApiError::validation(
            "Missing OldPasswordHash / NewPasswordHash",
        ));
    };

    state
        .with_db(|conn| staff::change_password(conn, staff_id, old_hash, new_hash))
        .await?;
    Ok(Json(json!({"status": "ok"})))
}
