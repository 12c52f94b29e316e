#![forbid(unsafe_code)]
//! The Civica HTTP server.
//!
//! One shared SQLite connection behind an async mutex, a stateless
//! signed-cookie session layer, and a handler per route of the public
//! surface. Handlers decode the session identity once, pass it into the
//! store's domain operations, and translate results into JSON bodies or
//! redirect-plus-flash responses.

use axum::routing::get;
use axum::Router;
use rusqlite::Connection;
use std::sync::atomic::{AtomicBool, AtomicU64};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

pub mod config;
mod http;
pub mod session;
mod telemetry;

pub use config::ServerConfig;

pub const CRATE_NAME: &str = "civica-server";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<Connection>>,
    pub config: Arc<ServerConfig>,
    pub ready: Arc<AtomicBool>,
    pub(crate) metrics: Arc<telemetry::RequestMetrics>,
    pub(crate) request_id_seed: Arc<AtomicU64>,
}

impl AppState {
    #[must_use]
    pub fn new(conn: Connection, config: ServerConfig) -> Self {
        Self {
            store: Arc::new(Mutex::new(conn)),
            config: Arc::new(config),
            ready: Arc::new(AtomicBool::new(true)),
            metrics: Arc::new(telemetry::RequestMetrics::default()),
            request_id_seed: Arc::new(AtomicU64::new(1)),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = if state.config.cors_allowed_origins.is_empty() {
        CorsLayer::new()
    } else {
        let origins: Vec<axum::http::HeaderValue> = state
            .config
            .cors_allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(origins)
    };
    Router::new()
        .route("/", get(http::announcements::index_handler))
        .route("/register", axum::routing::post(http::identity::register_handler))
        .route("/login", axum::routing::post(http::identity::login_handler))
        .route("/logout", get(http::identity::logout_handler))
        .route(
            "/post_announcement",
            axum::routing::post(http::announcements::post_announcement_handler),
        )
        .route("/questions", get(http::forum::questions_handler))
        .route(
            "/ask_question",
            axum::routing::post(http::forum::ask_question_handler),
        )
        .route("/question/{id}", get(http::forum::question_detail_handler))
        .route(
            "/answer/{id}",
            axum::routing::post(http::forum::post_answer_handler),
        )
        .route("/accept-answer/{id}", get(http::forum::accept_answer_handler))
        .route("/community", get(http::community::community_handler))
        .route(
            "/create_post",
            axum::routing::post(http::community::create_post_handler),
        )
        .route(
            "/comment_post/{id}",
            axum::routing::post(http::community::comment_post_handler),
        )
        .route("/delete_post/{id}", get(http::community::delete_post_handler))
        .route(
            "/community-forum",
            get(http::community::community_forum_handler),
        )
        .route(
            "/create-discussion",
            axum::routing::post(http::community::create_discussion_handler),
        )
        .route("/members", get(http::members::members_handler))
        .route("/member/{id}", get(http::members::member_detail_handler))
        .route("/search_members", get(http::members::search_members_handler))
        .route(
            "/edit_profile",
            get(http::members::edit_profile_form_handler)
                .post(http::members::edit_profile_handler),
        )
        .route("/volunteer", get(http::volunteer::volunteer_handler))
        .route(
            "/volunteer/{id}",
            get(http::volunteer::volunteer_detail_handler),
        )
        .route(
            "/post_opportunity",
            get(http::volunteer::post_opportunity_form_handler)
                .post(http::volunteer::post_opportunity_handler),
        )
        .route(
            "/apply_volunteer/{id}",
            get(http::volunteer::apply_form_handler).post(http::volunteer::apply_handler),
        )
        .route(
            "/my_applications",
            get(http::volunteer::my_applications_handler),
        )
        .route("/admin/dashboard", get(http::admin::dashboard_handler))
        .route("/admin/users", get(http::admin::users_handler))
        .route(
            "/admin/announcements",
            get(http::admin::announcements_handler),
        )
        .route("/admin/volunteers", get(http::admin::volunteers_handler))
        .route("/healthz", get(http::ops::healthz_handler))
        .route("/readyz", get(http::ops::readyz_handler))
        .route("/metrics", get(http::ops::metrics_handler))
        .layer(cors)
        .with_state(state)
}
