use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// The primary error type for the application.
///
/// Client errors map to a 4xx response with a plain status-text body and are
/// never logged as faults. Domain conflicts (`DuplicateEmail`,
/// `InvalidCredentials`) are normally caught by the handlers and turned into
/// form-level validation messages; they only reach `IntoResponse` if a handler
/// forgets to translate them. `Internal` is the fault case: logged with full
/// context, surfaced as an opaque 500.
#[derive(Debug, Error)]
pub enum AppError {
    /// Unexpected internal failure. Never shown to the client in detail.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
    /// The requested resource does not exist (or has expired).
    #[error("not found")]
    NotFound,
    /// The request was malformed (bad form body, bad CSRF token, ...).
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Login with an unknown email address or a wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// Signup with an email address that is already on file.
    #[error("duplicate email")]
    DuplicateEmail,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Internal(ref e) => {
                tracing::error!("Internal error: {:?}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(ref msg) => {
                tracing::debug!("Bad request: {}", msg);
                StatusCode::BAD_REQUEST
            }
            // Untranslated domain conflicts degrade to a client error.
            AppError::InvalidCredentials | AppError::DuplicateEmail => StatusCode::UNPROCESSABLE_ENTITY,
        };

        let body = status.canonical_reason().unwrap_or("Error").to_string();
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound,
            _ => AppError::Internal(anyhow::Error::new(err).context("database error")),
        }
    }
}

/// A type alias for `Result<T, AppError>`, used throughout the application.
pub type AppResult<T> = Result<T, AppError>;
