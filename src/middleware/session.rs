//! Session-enable interceptor.
//!
//! Ensures every request on the dynamic chain carries a [`Session`] handle in
//! its extensions: an existing unexpired session is loaded from the cookie
//! token, otherwise a fresh empty one is created. After the terminal handler
//! has run, the session is written back to the store iff it was modified, and
//! a cookie is issued for sessions created during this request.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};

use crate::session::{Session, SessionStore};
use crate::state::AppState;

pub async fn session_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let cookie_name = &state.config.session.cookie_name;

    let session = match cookie_value(req.headers(), cookie_name) {
        Some(token) => match state.sessions.load(&token).await {
            Some(values) => Session::loaded(token, values),
            // Unknown or expired token: start over with a new one
            None => Session::fresh(SessionStore::new_token()),
        },
        None => Session::fresh(SessionStore::new_token()),
    };

    req.extensions_mut().insert(session.clone());

    let mut res = next.run(req).await;

    // Persist at response-flush time, only if something changed
    if session.is_dirty() {
        state.sessions.save(session.token(), session.values()).await;
    }
    if session.is_fresh() && session.is_dirty() {
        let cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{}",
            cookie_name,
            session.token(),
            state.sessions.lifetime_secs(),
            if state.config.session.cookie_secure { "; Secure" } else { "" },
        );
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                res.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::error!("Failed to encode session cookie: {}", e),
        }
    }

    res
}

/// Extracts the value of the named cookie from the Cookie header(s).
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    for header in headers.get_all(header::COOKIE) {
        let Ok(raw) = header.to_str() else { continue };
        for pair in raw.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let key = parts.next()?;
            if key == name {
                if let Some(value) = parts.next() {
                    if !value.is_empty() {
                        return Some(value.to_string());
                    }
                }
            }
        }
    }
    None
}
