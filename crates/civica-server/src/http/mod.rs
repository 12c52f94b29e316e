//! Handler plumbing shared by every route: request ids, metrics scope,
//! session guards, and the JSON/redirect response builders.

use crate::session::{self, FlashNotice};
use crate::AppState;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use civica_api::{map_error, redirects_to_login, ApiError};
use civica_model::{DomainError, Identity};
use serde_json::{json, Value};
use std::sync::atomic::Ordering;
use std::time::Instant;
use tracing::{info, warn};

pub(crate) mod admin;
pub(crate) mod announcements;
pub(crate) mod community;
pub(crate) mod forum;
pub(crate) mod identity;
pub(crate) mod members;
pub(crate) mod ops;
pub(crate) mod volunteer;

pub(crate) fn make_request_id(state: &AppState) -> String {
    let id = state.request_id_seed.fetch_add(1, Ordering::Relaxed);
    format!("req-{id:016x}")
}

pub(crate) fn propagated_request_id(headers: &HeaderMap, state: &AppState) -> String {
    if let Some(raw) = headers.get("x-request-id").and_then(|v| v.to_str().ok()) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    make_request_id(state)
}

pub(crate) fn with_request_id(mut response: Response, request_id: &str) -> Response {
    if let Ok(v) = axum::http::HeaderValue::from_str(request_id) {
        response.headers_mut().insert("x-request-id", v);
    }
    response
}

/// Per-request bookkeeping: started instant, request id, metrics on exit.
pub(crate) struct RequestScope {
    state: AppState,
    route: &'static str,
    request_id: String,
    started: Instant,
}

impl RequestScope {
    pub(crate) fn begin(state: AppState, route: &'static str, headers: &HeaderMap) -> Self {
        let request_id = propagated_request_id(headers, &state);
        info!(request_id = %request_id, route, "request start");
        Self {
            state,
            route,
            request_id,
            started: Instant::now(),
        }
    }

    pub(crate) async fn finish(self, response: Response) -> Response {
        self.state
            .metrics
            .observe_request(self.route, response.status(), self.started.elapsed())
            .await;
        with_request_id(response, &self.request_id)
    }
}

/// JSON error envelope with the status from the contract mapping. Used by
/// read endpoints, where there is no form to send the browser back to.
pub(crate) fn api_error_response(err: &DomainError) -> Response {
    if let DomainError::Store(detail) = err {
        warn!(detail, "store failure");
    }
    let api: ApiError = err.into();
    let status = StatusCode::from_u16(map_error(&api).status_code)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({"error": api}))).into_response()
}

/// 303 plus a queued flash notice.
pub(crate) fn redirect_with_flash(to: &str, notice: &FlashNotice) -> Response {
    let mut response = Redirect::to(to).into_response();
    if let Some(cookie) = session::flash_cookie(notice) {
        response.headers_mut().append("set-cookie", cookie);
    }
    response
}

/// Browser-form failure: every domain error turns into a redirect with a
/// notice, the way the original site recovers. Authentication failures go
/// to the login page; everything else goes back to `fallback`.
pub(crate) fn redirect_for_error(err: &DomainError, fallback: &str) -> Response {
    if redirects_to_login(err) {
        return redirect_with_flash("/login", &FlashNotice::new("error", err.to_string()));
    }
    if let DomainError::Store(detail) = err {
        warn!(detail, "store failure");
        return redirect_with_flash(
            fallback,
            &FlashNotice::new("error", "Something went wrong. Please try again."),
        );
    }
    redirect_with_flash(fallback, &FlashNotice::new("error", err.to_string()))
}

/// JSON page body. A pending flash notice is folded into the payload and
/// its cookie cleared, completing the redirect-surviving channel.
pub(crate) fn json_page(headers: &HeaderMap, mut payload: Value) -> Response {
    let flash = session::pending_flash(headers);
    if let Some(notice) = &flash {
        payload["flash"] = serde_json::to_value(notice).unwrap_or(Value::Null);
    }
    let mut response = Json(payload).into_response();
    if flash.is_some() {
        response
            .headers_mut()
            .append("set-cookie", session::clear_flash_cookie());
    }
    response
}

pub(crate) fn require_login(
    headers: &HeaderMap,
    state: &AppState,
) -> Result<Identity, DomainError> {
    session::decode_session(headers, &state.config.session_secret)
        .ok_or(DomainError::Unauthorized)
}

pub(crate) fn require_admin(
    headers: &HeaderMap,
    state: &AppState,
) -> Result<Identity, DomainError> {
    let identity = require_login(headers, state)?;
    if !identity.is_admin {
        return Err(DomainError::Forbidden);
    }
    Ok(identity)
}
