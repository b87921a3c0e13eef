//! Interceptors for the HTTP request pipeline.
//!
//! Two chains are assembled in `routes`: the standard chain (panic recovery,
//! access logging, security headers) wraps every route, while the dynamic
//! chain (session enable, CSRF, authentication) wraps only the session-backed
//! web routes. `require_auth` is appended per-route just before the terminal
//! handler. Each interceptor either delegates to the rest of the chain exactly
//! once or short-circuits with a terminal response.

pub mod access_log;
pub mod auth;
pub mod csrf;
pub mod recover;
pub mod security_headers;
pub mod session;

pub use auth::IsAuthenticated;
