use axum::body::Body;
use axum::extract::State;
use axum::http::{Method, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use tableside_api::ApiError;
use tableside_auth::bearer_token;

use crate::state::AppState;

/// Routes reachable without a token: login itself, CORS pre-flight, and the
/// liveness probe.
fn is_bypassed(method: &Method, path: &str) -> bool {
    if *method == Method::OPTIONS {
        return true;
    }
    matches!(path, "/login" | "/healthz")
}

/// Bearer-token gate. Runs before every protected handler and turns any
/// credential problem into a 401/`{"error": ...}` body.
pub async fn require_bearer(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    if is_bypassed(&method, &path) {
        return next.run(req).await;
    }

    let header = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok());
    let verified = bearer_token(header).and_then(|token| state.tokens.verify(token));
    match verified {
        Ok(_claims) => next.run(req).await,
        Err(err) => {
            debug!(%method, path = %path, code = err.code.as_str(), "rejected request");
            ApiError::from(err).into_response()
        }
    }
}
