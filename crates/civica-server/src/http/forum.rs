// SPDX-License-Identifier: Apache-2.0

//! Q&A forum routes. Listing and detail require a session; accepting an
//! answer additionally requires question ownership.

use crate::http::{
    api_error_response, json_page, redirect_for_error, redirect_with_flash, require_login,
    RequestScope,
};
use crate::session::FlashNotice;
use crate::AppState;
use axum::extract::{Form, Path, State};
use axum::http::HeaderMap;
use axum::response::Response;
use civica_api::{checkbox_checked, AnswerForm, QuestionForm};
use civica_store::forum;
use serde_json::json;

pub(crate) async fn questions_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let scope = RequestScope::begin(state.clone(), "/questions", &headers);
    let response = match require_login(&headers, &state) {
        Ok(_) => {
            let conn = state.store.lock().await;
            match forum::list_questions(&conn) {
                Ok(questions) => json_page(&headers, json!({"questions": questions})),
                Err(err) => api_error_response(&err),
            }
        }
        Err(err) => redirect_for_error(&err, "/login"),
    };
    scope.finish(response).await
}

pub(crate) async fn ask_question_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<QuestionForm>,
) -> Response {
    let scope = RequestScope::begin(state.clone(), "/ask_question", &headers);
    let response = match require_login(&headers, &state) {
        Ok(identity) => {
            let is_urgent = checkbox_checked(&form.is_urgent);
            let conn = state.store.lock().await;
            match forum::ask_question(
                &conn,
                &identity,
                &form.title,
                &form.content,
                form.category.as_deref().unwrap_or(""),
                is_urgent,
            ) {
                Ok(_) => redirect_with_flash(
                    "/questions",
                    &FlashNotice::new("success", "Question posted successfully!"),
                ),
                Err(err) => redirect_for_error(&err, "/ask_question"),
            }
        }
        Err(err) => redirect_for_error(&err, "/login"),
    };
    scope.finish(response).await
}

pub(crate) async fn question_detail_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(question_id): Path<i64>,
) -> Response {
    let scope = RequestScope::begin(state.clone(), "/question/{id}", &headers);
    let response = match require_login(&headers, &state) {
        Ok(_) => {
            let conn = state.store.lock().await;
            match forum::get_question(&conn, question_id) {
                Ok((question, answers)) => {
                    json_page(&headers, json!({"question": question, "answers": answers}))
                }
                Err(err) => api_error_response(&err),
            }
        }
        Err(err) => redirect_for_error(&err, "/login"),
    };
    scope.finish(response).await
}

pub(crate) async fn post_answer_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(question_id): Path<i64>,
    Form(form): Form<AnswerForm>,
) -> Response {
    let scope = RequestScope::begin(state.clone(), "/answer/{id}", &headers);
    let response = match require_login(&headers, &state) {
        Ok(identity) => {
            let conn = state.store.lock().await;
            match forum::post_answer(&conn, &identity, question_id, &form.content) {
                Ok(answer) => redirect_with_flash(
                    &format!("/question/{}", answer.question_id),
                    &FlashNotice::new("success", "Your answer has been posted!"),
                ),
                Err(err) => redirect_for_error(&err, "/questions"),
            }
        }
        Err(err) => redirect_for_error(&err, "/login"),
    };
    scope.finish(response).await
}

pub(crate) async fn accept_answer_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(answer_id): Path<i64>,
) -> Response {
    let scope = RequestScope::begin(state.clone(), "/accept-answer/{id}", &headers);
    let response = match require_login(&headers, &state) {
        Ok(identity) => {
            let mut conn = state.store.lock().await;
            match forum::accept_answer(&mut conn, &identity, answer_id) {
                Ok(question_id) => redirect_with_flash(
                    &format!("/question/{question_id}"),
                    &FlashNotice::new("success", "Answer accepted! Question marked as resolved."),
                ),
                Err(err) => redirect_for_error(&err, "/questions"),
            }
        }
        Err(err) => redirect_for_error(&err, "/login"),
    };
    scope.finish(response).await
}
