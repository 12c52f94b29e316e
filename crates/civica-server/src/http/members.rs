// SPDX-License-Identifier: Apache-2.0

//! Member directory: public listing and search, owner-only editing.

use crate::http::{
    api_error_response, json_page, redirect_for_error, redirect_with_flash, require_login,
    RequestScope,
};
use crate::session::FlashNotice;
use crate::AppState;
use axum::extract::{Form, Path, Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use civica_api::{checkbox_checked, optional_text, ProfileForm, SearchQuery};
use civica_model::{DomainError, ProfileFields, PROFILE_DEFAULT_PROFESSION};
use civica_store::profiles;
use serde_json::json;

pub(crate) async fn members_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let scope = RequestScope::begin(state.clone(), "/members", &headers);
    let conn = state.store.lock().await;
    let response = match profiles::list_public_profiles(&conn) {
        Ok(members) => json_page(&headers, json!({"members": members})),
        Err(err) => api_error_response(&err),
    };
    drop(conn);
    scope.finish(response).await
}

pub(crate) async fn member_detail_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(member_id): Path<i64>,
) -> Response {
    let scope = RequestScope::begin(state.clone(), "/member/{id}", &headers);
    let conn = state.store.lock().await;
    let response = match profiles::get_public_profile(&conn, member_id) {
        Ok(member) => json_page(&headers, json!({"member": member})),
        Err(DomainError::NotVisible) => redirect_with_flash(
            "/members",
            &FlashNotice::new("error", "This member profile is not public"),
        ),
        Err(err) => api_error_response(&err),
    };
    drop(conn);
    scope.finish(response).await
}

pub(crate) async fn search_members_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SearchQuery>,
) -> Response {
    let scope = RequestScope::begin(state.clone(), "/search_members", &headers);
    let q = query.q.unwrap_or_default();
    let conn = state.store.lock().await;
    let response = match profiles::search_members(&conn, &q) {
        Ok(members) => json_page(&headers, json!({"members": members, "search_query": q})),
        Err(err) => api_error_response(&err),
    };
    drop(conn);
    scope.finish(response).await
}

pub(crate) async fn edit_profile_form_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let scope = RequestScope::begin(state.clone(), "/edit_profile", &headers);
    let response = match require_login(&headers, &state) {
        Ok(identity) => {
            let conn = state.store.lock().await;
            match profiles::get_or_create_profile(&conn, &identity) {
                Ok(profile) => json_page(&headers, json!({"profile": profile})),
                Err(err) => api_error_response(&err),
            }
        }
        Err(err) => redirect_for_error(&err, "/login"),
    };
    scope.finish(response).await
}

pub(crate) async fn edit_profile_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ProfileForm>,
) -> Response {
    let scope = RequestScope::begin(state.clone(), "/edit_profile", &headers);
    let response = match require_login(&headers, &state) {
        Ok(identity) => {
            let fields = ProfileFields {
                full_name: form.full_name.clone(),
                phone: optional_text(form.phone.clone()),
                location: optional_text(form.location.clone()),
                profession: optional_text(form.profession.clone())
                    .unwrap_or_else(|| PROFILE_DEFAULT_PROFESSION.to_string()),
                bio: form.bio.clone().unwrap_or_default(),
                is_public: checkbox_checked(&form.is_public),
            };
            let conn = state.store.lock().await;
            let result = profiles::get_or_create_profile(&conn, &identity).and_then(|profile| {
                profiles::update_profile(&conn, &identity, profile.id, &fields)
            });
            match result {
                Ok(profile) => redirect_with_flash(
                    &format!("/member/{}", profile.id),
                    &FlashNotice::new("success", "Profile updated successfully!"),
                ),
                Err(err) => redirect_for_error(&err, "/edit_profile"),
            }
        }
        Err(err) => redirect_for_error(&err, "/login"),
    };
    scope.finish(response).await
}
