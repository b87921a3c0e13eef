//! Request access logging.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    extract::{connect_info::ConnectInfo, FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

/// Optional extractor for the remote socket address. Unlike `ConnectInfo`,
/// this never rejects if the connection info extension is absent (e.g. in
/// tests or custom services).
#[derive(Clone, Copy, Debug, Default)]
pub struct MaybeRemoteAddr(pub Option<SocketAddr>);

impl<S> FromRequestParts<S> for MaybeRemoteAddr
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeRemoteAddr(parts.extensions.get::<ConnectInfo<SocketAddr>>().map(|ci| ci.0)))
    }
}

/// Logs method, path, protocol and remote address before delegating.
/// Pure side effect; the response is never touched.
pub async fn access_log_middleware(
    MaybeRemoteAddr(remote): MaybeRemoteAddr,
    req: Request,
    next: Next,
) -> Response {
    let remote = remote.map(|a| a.to_string()).unwrap_or_else(|| "-".to_string());
    tracing::info!(
        "{} - {:?} {} {}",
        remote,
        req.version(),
        req.method(),
        req.uri()
    );
    next.run(req).await
}
