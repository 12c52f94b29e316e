//! The landing page and announcement posting.

use crate::http::{
    api_error_response, json_page, redirect_for_error, redirect_with_flash, require_login,
    RequestScope,
};
use crate::session::FlashNotice;
use crate::AppState;
use axum::extract::{Form, State};
use axum::http::HeaderMap;
use axum::response::Response;
use civica_api::{checkbox_checked, AnnouncementForm};
use civica_store::announcements;
use serde_json::json;

pub(crate) async fn index_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let scope = RequestScope::begin(state.clone(), "/", &headers);
    let conn = state.store.lock().await;
    let response = match announcements::list_announcements(&conn) {
        Ok(list) => json_page(&headers, json!({"announcements": list})),
        Err(err) => api_error_response(&err),
    };
    drop(conn);
    scope.finish(response).await
}

pub(crate) async fn post_announcement_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<AnnouncementForm>,
) -> Response {
    let scope = RequestScope::begin(state.clone(), "/post_announcement", &headers);
    let response = match require_login(&headers, &state) {
        Ok(identity) => {
            let is_urgent = checkbox_checked(&form.is_urgent);
            let conn = state.store.lock().await;
            match announcements::create_announcement(
                &conn,
                &identity,
                &form.title,
                &form.content,
                is_urgent,
            ) {
                Ok(_) => redirect_with_flash(
                    "/",
                    &FlashNotice::new("success", "Announcement posted successfully!"),
                ),
                Err(err) => redirect_for_error(&err, "/post_announcement"),
            }
        }
        Err(err) => redirect_for_error(&err, "/"),
    };
    scope.finish(response).await
}
