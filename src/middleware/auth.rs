//! Authentication gate.
//!
//! `authenticate_middleware` derives the per-request "is authenticated" fact
//! from the session and attaches it as a typed extension; it never blocks a
//! request. `require_auth_middleware` enforces the fact for protected routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::session::{Session, KEY_AUTH_USER_ID};
use crate::state::AppState;

/// Typed request-context carrier for the authentication fact. Only ever
/// inserted with `true`; absence means unauthenticated.
#[derive(Clone, Copy, Debug)]
pub struct IsAuthenticated(pub bool);

/// Resolves the session's stored user id against the user repository.
///
/// A stale id (user gone or deactivated) is removed from the session and the
/// request proceeds unauthenticated. Only a genuine lookup fault terminates
/// the request.
pub async fn authenticate_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(session) = req.extensions().get::<Session>().cloned() else {
        tracing::error!("Authentication interceptor reached without a session in scope");
        return axum::http::StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };

    if let Some(user_id) = session.get_int(KEY_AUTH_USER_ID) {
        match state.users.get(user_id).await {
            Ok(Some(user)) if user.active => {
                req.extensions_mut().insert(IsAuthenticated(true));
            }
            Ok(_) => {
                session.remove(KEY_AUTH_USER_ID);
            }
            Err(e) => return e.into_response(),
        }
    }

    next.run(req).await
}

/// Short-circuits unauthenticated requests with a redirect to the login page;
/// authenticated responses are marked uncacheable.
pub async fn require_auth_middleware(req: Request, next: Next) -> Response {
    let authenticated =
        req.extensions().get::<IsAuthenticated>().map(|flag| flag.0).unwrap_or(false);
    if !authenticated {
        return Redirect::to("/user/login").into_response();
    }

    let mut res = next.run(req).await;
    res.headers_mut().insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    res
}
