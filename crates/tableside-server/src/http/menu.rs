use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

use tableside_api::ApiError;
use tableside_db::menu;
use tableside_model::MenuItem;

use crate::http::array_body;
use crate::state::AppState;

pub async fn list_handler(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let items = state.with_db(menu::list_menu).await?;
    Ok(Json(json!(items)))
}

pub async fn sync_handler(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let body = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let items: Vec<MenuItem> = array_body(body)?;
    let count = state.with_db(|conn| menu::sync_menu(conn, &items)).await?;
    Ok(Json(json!({"status": "ok", "count": count})))
}

pub async fn delete_handler(
    State(state): State<AppState>,
    Path(menu_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    state
        .with_db(|conn| menu::delete_menu_item(conn, menu_id))
        .await?;
    Ok(Json(json!({"status": "ok"})))
}
