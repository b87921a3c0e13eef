//! Cross-Site Request Forgery (CSRF) protection.
//!
//! Every session gets a random anti-forgery token; forms deliver it back as a
//! hidden `csrf_token` field. State-changing requests (POST) must present the
//! session-bound token or the chain short-circuits with 400 before any handler
//! or validation runs. The buffered body is restored for downstream extractors.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::session::{Session, KEY_CSRF_TOKEN};

/// Form field carrying the anti-forgery token.
pub const CSRF_FORM_FIELD: &str = "csrf_token";

/// Largest form body the token check will buffer.
const MAX_FORM_BYTES: usize = 1024 * 1024;

pub async fn csrf_middleware(req: Request, next: Next) -> Response {
    let Some(session) = req.extensions().get::<Session>().cloned() else {
        tracing::error!("CSRF interceptor reached without a session in scope");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };

    // Issue the per-session token on first contact
    let expected = match session.get_string(KEY_CSRF_TOKEN) {
        Some(token) => token,
        None => {
            let token = Uuid::new_v4().simple().to_string();
            session.insert(KEY_CSRF_TOKEN, token.clone());
            token
        }
    };

    if req.method() != Method::POST {
        return next.run(req).await;
    }

    let (parts, body) = req.into_parts();
    let bytes = match axum::body::to_bytes(body, MAX_FORM_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!("Failed to buffer form body: {}", e);
            return bad_request();
        }
    };

    if !token_matches(&bytes, &expected) {
        return bad_request();
    }

    let req = Request::from_parts(parts, Body::from(bytes));
    next.run(req).await
}

fn bad_request() -> Response {
    (StatusCode::BAD_REQUEST, "Bad Request").into_response()
}

/// Decodes the urlencoded body and compares the submitted token against the
/// session-bound one in constant time.
fn token_matches(body: &Bytes, expected: &str) -> bool {
    let pairs: Vec<(String, String)> = match serde_urlencoded::from_bytes(body) {
        Ok(pairs) => pairs,
        Err(_) => return false,
    };
    let Some(submitted) = pairs.into_iter().find(|(k, _)| k == CSRF_FORM_FIELD).map(|(_, v)| v)
    else {
        return false;
    };

    let submitted = submitted.as_bytes();
    let expected = expected.as_bytes();
    if submitted.len() != expected.len() {
        return false;
    }
    let mut diff = 0u8;
    for (a, b) in submitted.iter().zip(expected) {
        diff |= a ^ b;
    }
    diff == 0
}
