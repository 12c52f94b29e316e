// SPDX-License-Identifier: Apache-2.0

//! Volunteer board routes. Browsing and applying are public; posting an
//! opportunity and the personal application list require a session.

use crate::http::{
    api_error_response, json_page, redirect_for_error, redirect_with_flash, require_login,
    RequestScope,
};
use crate::session::FlashNotice;
use crate::AppState;
use axum::extract::{Form, Path, State};
use axum::http::HeaderMap;
use axum::response::Response;
use civica_api::{ApplicationForm, OpportunityForm};
use civica_model::DomainError;
use civica_store::volunteer;
use serde_json::json;

pub(crate) async fn volunteer_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let scope = RequestScope::begin(state.clone(), "/volunteer", &headers);
    let conn = state.store.lock().await;
    let response = match volunteer::list_opportunities(&conn) {
        Ok(opportunities) => json_page(&headers, json!({"opportunities": opportunities})),
        Err(err) => api_error_response(&err),
    };
    drop(conn);
    scope.finish(response).await
}

fn opportunity_detail_response(
    headers: &HeaderMap,
    result: Result<civica_model::VolunteerOpportunity, DomainError>,
) -> Response {
    match result {
        Ok(opportunity) if opportunity.is_active => {
            json_page(headers, json!({"opportunity": opportunity}))
        }
        Ok(_) => redirect_with_flash(
            "/volunteer",
            &FlashNotice::new("error", "This volunteer opportunity is no longer available"),
        ),
        Err(err) => api_error_response(&err),
    }
}

pub(crate) async fn volunteer_detail_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(opportunity_id): Path<i64>,
) -> Response {
    let scope = RequestScope::begin(state.clone(), "/volunteer/{id}", &headers);
    let conn = state.store.lock().await;
    let result = volunteer::get_opportunity(&conn, opportunity_id);
    drop(conn);
    let response = opportunity_detail_response(&headers, result);
    scope.finish(response).await
}

pub(crate) async fn post_opportunity_form_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let scope = RequestScope::begin(state.clone(), "/post_opportunity", &headers);
    let response = match require_login(&headers, &state) {
        Ok(identity) => json_page(&headers, json!({"posting_as": identity.username})),
        Err(err) => redirect_for_error(&err, "/login"),
    };
    scope.finish(response).await
}

pub(crate) async fn post_opportunity_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<OpportunityForm>,
) -> Response {
    let scope = RequestScope::begin(state.clone(), "/post_opportunity", &headers);
    let response = match require_login(&headers, &state) {
        Ok(identity) => {
            let draft = form.into_draft();
            let conn = state.store.lock().await;
            match volunteer::post_opportunity(&conn, &identity, &draft) {
                Ok(_) => redirect_with_flash(
                    "/volunteer",
                    &FlashNotice::new("success", "Volunteer opportunity posted successfully!"),
                ),
                Err(err) => redirect_for_error(&err, "/post_opportunity"),
            }
        }
        Err(err) => redirect_for_error(&err, "/login"),
    };
    scope.finish(response).await
}

pub(crate) async fn apply_form_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(opportunity_id): Path<i64>,
) -> Response {
    let scope = RequestScope::begin(state.clone(), "/apply_volunteer/{id}", &headers);
    let conn = state.store.lock().await;
    let result = volunteer::get_opportunity(&conn, opportunity_id);
    drop(conn);
    let response = opportunity_detail_response(&headers, result);
    scope.finish(response).await
}

pub(crate) async fn apply_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(opportunity_id): Path<i64>,
    Form(form): Form<ApplicationForm>,
) -> Response {
    let scope = RequestScope::begin(state.clone(), "/apply_volunteer/{id}", &headers);
    let draft = form.into_draft();
    let mut conn = state.store.lock().await;
    let result = volunteer::apply_to_opportunity(&mut conn, opportunity_id, &draft);
    drop(conn);
    let response = match result {
        Ok(application) => redirect_with_flash(
            &format!("/volunteer/{}", application.opportunity_id),
            &FlashNotice::new(
                "success",
                "Application submitted successfully! We will contact you soon.",
            ),
        ),
        Err(err @ DomainError::DuplicateApplication) => redirect_with_flash(
            &format!("/volunteer/{opportunity_id}"),
            &FlashNotice::new("error", err.to_string()),
        ),
        Err(err) => redirect_for_error(&err, "/volunteer"),
    };
    scope.finish(response).await
}

pub(crate) async fn my_applications_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let scope = RequestScope::begin(state.clone(), "/my_applications", &headers);
    let response = match require_login(&headers, &state) {
        Ok(identity) => {
            let conn = state.store.lock().await;
            match volunteer::list_my_applications(&conn, &identity) {
                Ok(applications) => json_page(&headers, json!({"applications": applications})),
                Err(err) => api_error_response(&err),
            }
        }
        Err(err) => redirect_for_error(&err, "/login"),
    };
    scope.finish(response).await
}
