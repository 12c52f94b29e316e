// SPDX-License-Identifier: Apache-2.0

//! Identity lifecycle: register, login, logout.

use crate::http::{redirect_for_error, redirect_with_flash, RequestScope};
use crate::session::{self, FlashNotice};
use crate::AppState;
use axum::extract::{Form, State};
use axum::http::HeaderMap;
use axum::response::Response;
use civica_api::{LoginForm, RegisterForm};
use civica_store::users;
use tracing::info;

pub(crate) async fn register_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<RegisterForm>,
) -> Response {
    let scope = RequestScope::begin(state.clone(), "/register", &headers);
    let conn = state.store.lock().await;
    let response = match users::register(
        &conn,
        &form.username,
        &form.email,
        &form.password,
        form.role.as_deref().filter(|r| !r.trim().is_empty()),
    ) {
        Ok(user) => {
            info!(username = %user.username, "user registered");
            redirect_with_flash(
                "/login",
                &FlashNotice::new("success", "Registration successful! Please login."),
            )
        }
        Err(err) => redirect_for_error(&err, "/register"),
    };
    drop(conn);
    scope.finish(response).await
}

pub(crate) async fn login_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Response {
    let scope = RequestScope::begin(state.clone(), "/login", &headers);
    let conn = state.store.lock().await;
    let response = match users::authenticate(&conn, &form.username, &form.password) {
        Ok(identity) => {
            info!(username = %identity.username, "login");
            let mut response =
                redirect_with_flash("/", &FlashNotice::new("success", "Login successful!"));
            if let Some(cookie) = session::issue_session_cookie(
                &identity,
                &state.config.session_secret,
                state.config.session_ttl,
            ) {
                response.headers_mut().append("set-cookie", cookie);
            }
            response
        }
        Err(err) => redirect_for_error(&err, "/login"),
    };
    drop(conn);
    scope.finish(response).await
}

pub(crate) async fn logout_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let scope = RequestScope::begin(state.clone(), "/logout", &headers);
    let mut response =
        redirect_with_flash("/", &FlashNotice::new("info", "You have been logged out."));
    response
        .headers_mut()
        .append("set-cookie", session::clear_session_cookie());
    scope.finish(response).await
}
