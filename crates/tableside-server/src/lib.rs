//! HTTP server for the tableside POS backend.
//!
//! Everything except `/login`, pre-flight, and `/healthz` sits behind the
//! bearer-token middleware; handlers run one DB transaction each and report
//! failures as `{"error": ...}` JSON.

#![forbid(unsafe_code)]

use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, patch, post, put};
use axum::Router;

pub mod config;
pub mod http;
pub mod middleware;
pub mod state;

pub use config::{validate_startup_config, ServerConfig};
pub use state::AppState;

pub fn build_router(state: AppState) -> Router {
    // Body limit leaves headroom over the archive's own gate so oversized
    // uploads reach the handler and fail with the JSON 413, not a bare one.
    let body_limit = state.config.max_upload_bytes.saturating_add(4096);
    Router::new()
        .route("/healthz", get(http::login::healthz_handler))
        .route("/login", post(http::login::login_handler))
        .route("/raports/archive", post(http::raports::archive_handler))
        .route("/raports/upload-gz", post(http::raports::upload_gz_handler))
        .route("/raports/day", get(http::raports::day_handler))
        .route("/raports/download", get(http::raports::download_handler))
        .route("/raports/list", get(http::raports::list_handler))
        .route("/raports/exists", get(http::raports::exists_handler))
        .route("/staff", get(http::staff::list_handler).post(http::staff::create_handler))
        .route(
            "/staff/:staff_id",
            put(http::staff::update_handler).delete(http::staff::delete_handler),
        )
        .route("/staff/sync", post(http::staff::sync_handler))
        .route("/staff/:staff_id/password", patch(http::staff::password_handler))
        .route("/menu", get(http::menu::list_handler))
        .route("/menu/sync", post(http::menu::sync_handler))
        .route("/menu/:menu_id", delete(http::menu::delete_handler))
        .route("/tables", get(http::tables::list_handler))
        .route("/tables/sync", post(http::tables::sync_handler))
        .route("/tables/:table_id", patch(http::tables::patch_handler))
        .route("/table-groups", get(http::tables::groups_list_handler))
        .route("/table-groups/sync", post(http::tables::groups_sync_handler))
        .route("/orders", get(http::orders::list_handler).post(http::orders::create_handler))
        .route("/orders/sync", post(http::orders::sync_handler))
        .route("/orders/closed", get(http::orders::closed_handler))
        .route("/orders/closed/purge", post(http::orders::purge_closed_handler))
        .route(
            "/orders/:order_id",
            delete(http::orders::delete_handler),
        )
        .route("/orders/:order_id/items", post(http::orders::add_item_handler))
        .route(
            "/orders/:order_id/items/:item_id",
            patch(http::orders::update_item_handler).delete(http::orders::delete_item_handler),
        )
        .route("/orders/:order_id/status", patch(http::orders::status_handler))
        .route("/reservations", get(http::reservations::list_handler))
        .route("/reservations/sync", post(http::reservations::sync_handler))
        .route(
            "/reservations/:reservation_id/approved",
            patch(http::reservations::approved_handler),
        )
        .route("/stock", get(http::stock::list_handler).post(http::stock::create_handler))
        .route("/stock/:item_id", patch(http::stock::patch_handler))
        .route("/stock/:item_id/adjust", post(http::stock::adjust_handler))
        .route("/settings", get(http::settings::list_handler))
        .route(
            "/settings/reservations",
            get(http::settings::reservations_get_handler)
                .put(http::settings::reservations_put_handler),
        )
        .route("/settings/bulk", patch(http::settings::bulk_patch_handler))
        .route("/settings/admin", get(http::settings::admin_handler))
        .layer(from_fn_with_state(state.clone(), middleware::require_bearer))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
