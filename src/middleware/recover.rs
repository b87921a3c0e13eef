//! Panic recovery at the outermost chain boundary.
//!
//! A panic anywhere further down the chain terminates only the current
//! request: the payload is logged, the connection is marked non-reusable and
//! the client receives an opaque 500. This is the single place where faults
//! are caught; nothing below it may let one escape the process.

use std::any::Any;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tower_http::catch_panic::CatchPanicLayer;

type PanicHandler = fn(Box<dyn Any + Send + 'static>) -> Response;

pub fn recover_layer() -> CatchPanicLayer<PanicHandler> {
    CatchPanicLayer::custom(handle_panic as PanicHandler)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!("Recovered from panic while handling request: {}", detail);

    let mut res =
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response();
    // Ask the server to drop the connection after this response
    res.headers_mut().insert(header::CONNECTION, HeaderValue::from_static("close"));
    res
}
