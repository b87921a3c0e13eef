//! Shared helpers for the integration tests.

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use http_body_util::BodyExt; // for .collect()
use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePoolOptions};
use tempfile::NamedTempFile;
use tower::ServiceExt;

use crate::config::{AppConfig, DatabaseConfig, ServerConfig, SessionConfig};
use crate::routes;
use crate::state::AppState;

/// Builds an isolated application state on a temporary SQLite database.
/// The returned [`NamedTempFile`] guard must be kept alive for the test.
pub async fn setup_state() -> (AppState, NamedTempFile) {
    let temp_db = NamedTempFile::new().unwrap();
    let db_url = format!("sqlite:{}", temp_db.path().display());

    sqlx::Sqlite::create_database(&db_url).await.unwrap();

    let pool = SqlitePoolOptions::new().max_connections(1).connect(&db_url).await.unwrap();

    crate::db::init_db(&pool).await.unwrap();

    let config = AppConfig {
        server: ServerConfig { host: "127.0.0.1".to_string(), port: 4000 },
        database: DatabaseConfig { url: db_url },
        session: SessionConfig {
            cookie_name: "session".to_string(),
            lifetime_hours: 12,
            cookie_secure: true,
        },
    };

    (AppState::new(pool, config), temp_db)
}

/// Full application router plus its state.
pub async fn setup_app() -> (Router, AppState, NamedTempFile) {
    let (state, guard) = setup_state().await;
    let app = routes::router(state.clone());
    (app, state, guard)
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn get_with_cookie(app: &Router, uri: &str, cookie: &str) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

/// Sends a urlencoded form POST, optionally with a session cookie.
pub async fn post_form(
    app: &Router,
    uri: &str,
    cookie: Option<&str>,
    fields: &[(&str, &str)],
) -> Response<Body> {
    let body = serde_urlencoded::to_string(fields).unwrap();
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    app.clone().oneshot(builder.body(Body::from(body)).unwrap()).await.unwrap()
}

pub async fn body_string(res: Response<Body>) -> String {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Extracts `name=value` of the session cookie from a Set-Cookie header.
pub fn session_cookie(res: &Response<Body>) -> Option<String> {
    let raw = res.headers().get(header::SET_COOKIE)?.to_str().ok()?;
    raw.split(';').next().map(|s| s.trim().to_string())
}

/// Pulls the hidden CSRF token out of a rendered form.
pub fn csrf_token(html: &str) -> Option<String> {
    let marker = r#"name="csrf_token" value=""#;
    let start = html.find(marker)? + marker.len();
    let end = html[start..].find('"')? + start;
    Some(html[start..end].to_string())
}

/// GETs a page that renders a form and returns (session cookie, csrf token).
pub async fn obtain_session(app: &Router, uri: &str) -> (String, String) {
    let res = get(app, uri).await;
    let cookie = session_cookie(&res).expect("first response should set a session cookie");
    let html = body_string(res).await;
    let token = csrf_token(&html).expect("rendered form should carry a csrf token");
    (cookie, token)
}
