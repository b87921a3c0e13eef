use axum::{http::StatusCode, response::IntoResponse};

// Health check endpoint - no session, no auth
pub async fn healthcheck() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
