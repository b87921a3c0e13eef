//! HTTP handlers and router assembly.

pub mod health;
pub mod snippets;
pub mod users;

use axum::{
    extract::{DefaultBodyLimit, Extension},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use chrono::{Datelike, Utc};
use tower_http::services::ServeDir;

use crate::middleware::{self, IsAuthenticated};
use crate::session::{Session, KEY_CSRF_TOKEN, KEY_FLASH};
use crate::state::AppState;
use crate::templates::TemplateData;

const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/ui/static");

/// Builds the complete application router with both interceptor chains.
///
/// Standard chain (outermost first): panic recovery, access log, security
/// headers — applied to every route including `/healthcheck` and `/static`.
/// Dynamic chain: session enable, CSRF, authenticate — applied to the web
/// routes only; `require_auth` wraps the protected subset.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/snippet/create", get(snippets::create_form).post(snippets::create_post))
        .route("/user/logout", post(users::logout_post))
        .route_layer(from_fn(middleware::auth::require_auth_middleware));

    let web = Router::new()
        .route("/", get(snippets::home))
        .route("/snippet/{id}", get(snippets::show))
        .route("/user/signup", get(users::signup_form).post(users::signup_post))
        .route("/user/login", get(users::login_form).post(users::login_post))
        .merge(protected)
        .layer(from_fn_with_state(state.clone(), middleware::auth::authenticate_middleware))
        .layer(from_fn(middleware::csrf::csrf_middleware))
        .layer(from_fn_with_state(state.clone(), middleware::session::session_middleware));

    Router::new()
        .route("/healthcheck", get(health::healthcheck))
        .merge(web)
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .with_state(state)
        // Globales Body-Limit (10 MB) – schützt vor übergroßen Requests
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(from_fn(middleware::security_headers::security_headers_middleware))
        .layer(from_fn(middleware::access_log::access_log_middleware))
        .layer(middleware::recover::recover_layer())
}

/// Default data every rendered page receives: current year, popped flash,
/// authentication fact and the session's CSRF token.
pub(crate) fn base_data(session: &Session, is_authenticated: bool) -> TemplateData {
    TemplateData {
        current_year: Utc::now().year(),
        flash: session.pop_string(KEY_FLASH),
        is_authenticated,
        csrf_token: session.get_string(KEY_CSRF_TOKEN).unwrap_or_default(),
    }
}

pub(crate) fn auth_flag(flag: Option<Extension<IsAuthenticated>>) -> bool {
    flag.map(|Extension(IsAuthenticated(v))| v).unwrap_or(false)
}
