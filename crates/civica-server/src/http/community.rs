//! Community post board and the discussion forum.

use crate::http::{
    api_error_response, json_page, redirect_for_error, redirect_with_flash, require_login,
    RequestScope,
};
use crate::session::FlashNotice;
use crate::AppState;
use axum::extract::{Form, Path, State};
use axum::http::HeaderMap;
use axum::response::Response;
use civica_api::{CommentForm, DiscussionForm, PostForm};
use civica_store::{community, discussions};
use serde_json::json;

pub(crate) async fn community_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let scope = RequestScope::begin(state.clone(), "/community", &headers);
    let conn = state.store.lock().await;
    let response = match community::list_posts(&conn) {
        Ok(posts) => json_page(&headers, json!({"posts": posts})),
        Err(err) => api_error_response(&err),
    };
    drop(conn);
    scope.finish(response).await
}

pub(crate) async fn create_post_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<PostForm>,
) -> Response {
    let scope = RequestScope::begin(state.clone(), "/create_post", &headers);
    let response = match require_login(&headers, &state) {
        Ok(identity) => {
            let conn = state.store.lock().await;
            match community::create_post(
                &conn,
                &identity,
                &form.title,
                &form.content,
                form.category.as_deref().unwrap_or(""),
            ) {
                Ok(_) => redirect_with_flash(
                    "/community",
                    &FlashNotice::new("success", "Post created successfully!"),
                ),
                Err(err) => redirect_for_error(&err, "/create_post"),
            }
        }
        Err(err) => redirect_for_error(&err, "/login"),
    };
    scope.finish(response).await
}

pub(crate) async fn comment_post_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(post_id): Path<i64>,
    Form(form): Form<CommentForm>,
) -> Response {
    let scope = RequestScope::begin(state.clone(), "/comment_post/{id}", &headers);
    let response = match require_login(&headers, &state) {
        Ok(identity) => {
            let conn = state.store.lock().await;
            match community::comment_on_post(&conn, &identity, post_id, &form.content) {
                Ok(_) => redirect_with_flash(
                    "/community",
                    &FlashNotice::new("success", "Comment posted successfully!"),
                ),
                Err(err) => redirect_for_error(&err, "/community"),
            }
        }
        Err(err) => redirect_for_error(&err, "/login"),
    };
    scope.finish(response).await
}

pub(crate) async fn delete_post_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(post_id): Path<i64>,
) -> Response {
    let scope = RequestScope::begin(state.clone(), "/delete_post/{id}", &headers);
    let response = match require_login(&headers, &state) {
        Ok(identity) => {
            let mut conn = state.store.lock().await;
            match community::delete_post(&mut conn, &identity, post_id) {
                Ok(()) => redirect_with_flash(
                    "/community",
                    &FlashNotice::new("success", "Post deleted successfully!"),
                ),
                Err(err) => redirect_for_error(&err, "/community"),
            }
        }
        Err(err) => redirect_for_error(&err, "/login"),
    };
    scope.finish(response).await
}

pub(crate) async fn community_forum_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let scope = RequestScope::begin(state.clone(), "/community-forum", &headers);
    let response = match require_login(&headers, &state) {
        Ok(_) => {
            let conn = state.store.lock().await;
            match discussions::list_discussions(&conn) {
                Ok(list) => json_page(&headers, json!({"discussions": list})),
                Err(err) => api_error_response(&err),
            }
        }
        Err(err) => redirect_for_error(&err, "/login"),
    };
    scope.finish(response).await
}

pub(crate) async fn create_discussion_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<DiscussionForm>,
) -> Response {
    let scope = RequestScope::begin(state.clone(), "/create-discussion", &headers);
    let response = match require_login(&headers, &state) {
        Ok(identity) => {
            let conn = state.store.lock().await;
            match discussions::create_discussion(
                &conn,
                &identity,
                &form.title,
                &form.content,
                form.topic.as_deref().unwrap_or(""),
            ) {
                Ok(_) => redirect_with_flash(
                    "/community-forum",
                    &FlashNotice::new("success", "Discussion started successfully!"),
                ),
                Err(err) => redirect_for_error(&err, "/create-discussion"),
            }
        }
        Err(err) => redirect_for_error(&err, "/login"),
    };
    scope.finish(response).await
}
