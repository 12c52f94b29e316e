//! Liveness, readiness, and metrics endpoints.

use crate::http::{make_request_id, with_request_id, RequestScope};
use crate::AppState;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::atomic::Ordering;

pub(crate) async fn healthz_handler(State(state): State<AppState>) -> Response {
    let request_id = make_request_id(&state);
    with_request_id((StatusCode::OK, "ok").into_response(), &request_id)
}

pub(crate) async fn readyz_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let scope = RequestScope::begin(state.clone(), "/readyz", &headers);
    let store_ok = {
        let conn = state.store.lock().await;
        conn.query_row("SELECT 1", [], |r| r.get::<_, i64>(0)).is_ok()
    };
    let response = if state.ready.load(Ordering::Relaxed) && store_ok {
        (StatusCode::OK, "ready").into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not-ready").into_response()
    };
    scope.finish(response).await
}

pub(crate) async fn metrics_handler(State(state): State<AppState>) -> Response {
    let request_id = make_request_id(&state);
    let snapshot = state.metrics.snapshot().await;
    with_request_id(Json(snapshot).into_response(), &request_id)
}
