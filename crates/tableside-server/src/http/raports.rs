use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use tracing::info;

use tableside_api::ApiError;
use tableside_archive::MergeReceipt;
use tableside_model::{ReportDate, ReportEntry};

use crate::http::required_date_param;
use crate::state::AppState;

fn receipt_json(receipt: &MergeReceipt) -> Value {
    json!({
        "status": "ok",
        "date": receipt.date,
        "entries_added": receipt.entries_added,
        "total_entries": receipt.total_entries,
        "file": receipt.file,
    })
}

/// `POST /raports/archive`: one entry, uncompressed JSON body.
pub async fn archive_handler(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let body = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let Value::Object(map) = body else {
        return Err(ApiError::validation("Expected JSON object"));
    };

    let date = match map.get("Date").and_then(Value::as_str) {
        Some(raw) if !raw.is_empty() => ReportDate::parse(raw)?,
        _ => ReportDate::today(),
    };

    let entry = ReportEntry::received_now(
        date,
        map.get("Source").cloned(),
        map.get("Payload").cloned(),
    );
    let receipt = state.archive.append(date, vec![entry.into_value()])?;
    info!(date = %receipt.date, total = receipt.total_entries, "archived entry");
    Ok(Json(receipt_json(&receipt)))
}

/// `POST /raports/upload-gz`: raw gzip JSON body, bulk append.
pub async fn upload_gz_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let receipt = state.archive.upload_compressed(&body)?;
    info!(
        date = %receipt.date,
        added = receipt.entries_added,
        total = receipt.total_entries,
        "uploaded report"
    );
    Ok(Json(receipt_json(&receipt)))
}

/// `GET /raports/day?date=YYYY-MM-DD`: decompressed report document.
pub async fn day_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let date = required_date_param(&params)?;
    let report = state.archive.read_day(date)?;
    Ok(Json(serde_json::to_value(report).map_err(|e| {
        ApiError::internal(e.to_string())
    })?))
}

/// `GET /raports/download?date=YYYY-MM-DD`: raw `.json.gz` attachment.
pub async fn download_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let date = required_date_param(&params)?;
    let (name, bytes) = state.archive.read_day_raw(date)?;
    let headers = [
        (header::CONTENT_TYPE, "application/gzip".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{name}\""),
        ),
    ];
    Ok((StatusCode::OK, headers, bytes).into_response())
}

/// `GET /raports/list?year=&month=`
pub async fn list_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let year = params.get("year").map(String::as_str).filter(|s| !s.is_empty());
    let month = params.get("month").map(String::as_str).filter(|s| !s.is_empty());
    let items = state.archive.list(year, month)?;
    Ok(Json(json!({ "Items": items })))
}

/// `GET /raports/exists?date=YYYY-MM-DD`
pub async fn exists_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let date = required_date_param(&params)?;
    Ok(Json(json!({
        "Date": date.iso(),
        "Exists": state.archive.exists(date),
    })))
}
