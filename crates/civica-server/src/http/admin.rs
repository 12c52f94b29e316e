//! Admin-only reads. A missing session and a non-admin session are both
//! bounced to the login page, matching the public site's behavior.

use crate::http::{api_error_response, json_page, redirect_with_flash, require_admin, RequestScope};
use crate::session::FlashNotice;
use crate::AppState;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Response;
use chrono::Utc;
use civica_store::{announcements, stats, users, volunteer};
use serde_json::json;

fn admin_gate_redirect() -> Response {
    redirect_with_flash(
        "/login",
        &FlashNotice::new("error", "Administrator access required"),
    )
}

pub(crate) async fn dashboard_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let scope = RequestScope::begin(state.clone(), "/admin/dashboard", &headers);
    let response = match require_admin(&headers, &state) {
        Ok(_) => {
            let conn = state.store.lock().await;
            match stats::dashboard_stats(&conn) {
                Ok(dashboard) => json_page(&headers, json!({"stats": dashboard})),
                Err(err) => api_error_response(&err),
            }
        }
        Err(_) => admin_gate_redirect(),
    };
    scope.finish(response).await
}

pub(crate) async fn users_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let scope = RequestScope::begin(state.clone(), "/admin/users", &headers);
    let response = match require_admin(&headers, &state) {
        Ok(_) => {
            let conn = state.store.lock().await;
            match users::list_users(&conn) {
                Ok(list) => json_page(&headers, json!({"users": list})),
                Err(err) => api_error_response(&err),
            }
        }
        Err(_) => admin_gate_redirect(),
    };
    scope.finish(response).await
}

pub(crate) async fn announcements_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let scope = RequestScope::begin(state.clone(), "/admin/announcements", &headers);
    let response = match require_admin(&headers, &state) {
        Ok(_) => {
            let conn = state.store.lock().await;
            let listed = stats::month_start(Utc::now())
                .and_then(|month_start| {
                    announcements::list_announcements(&conn).map(|list| (month_start, list))
                });
            match listed {
                Ok((month_start, list)) => {
                    let annotated: Vec<_> = list
                        .into_iter()
                        .map(|ann| {
                            let created_this_month = ann.created_at >= month_start;
                            json!({
                                "announcement": ann,
                                "created_this_month": created_this_month
                            })
                        })
                        .collect();
                    json_page(&headers, json!({"announcements": annotated}))
                }
                Err(err) => api_error_response(&err),
            }
        }
        Err(_) => admin_gate_redirect(),
    };
    scope.finish(response).await
}

pub(crate) async fn volunteers_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let scope = RequestScope::begin(state.clone(), "/admin/volunteers", &headers);
    let response = match require_admin(&headers, &state) {
        Ok(_) => {
            let conn = state.store.lock().await;
            let combined = volunteer::list_all_opportunities(&conn).and_then(|opportunities| {
                volunteer::list_all_applications(&conn)
                    .map(|applications| (opportunities, applications))
            });
            match combined {
                Ok((opportunities, applications)) => json_page(
                    &headers,
                    json!({"opportunities": opportunities, "applications": applications}),
                ),
                Err(err) => api_error_response(&err),
            }
        }
        Err(_) => admin_gate_redirect(),
    };
    scope.finish(response).await
}
