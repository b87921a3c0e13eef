//! Security headers applied to every response.

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};

/// Unconditionally sets the two fixed anti-XSS/anti-clickjacking headers.
pub async fn security_headers_middleware(req: Request, next: Next) -> Response {
    let mut res = next.run(req).await;
    let headers = res.headers_mut();

    headers.insert(
        HeaderName::from_static("x-xss-protection"),
        HeaderValue::from_static("1; mode=block"),
    );
    headers.insert(HeaderName::from_static("x-frame-options"), HeaderValue::from_static("deny"));

    res
}
