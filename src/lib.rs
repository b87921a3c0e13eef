//! # Zettelbox
//!
//! A small web application for sharing short-lived text snippets, with user
//! signup/login. Every inbound request flows through an ordered chain of
//! interceptors; session-backed authentication and a declarative form
//! validation engine sit behind it.
//!
//! ## Architecture
//!
//! The application is built using:
//! - **Axum**: HTTP server, routing and middleware composition
//! - **SQLx**: Asynchronous SQLite persistence
//! - **Tokio**: Async runtime
//! - **Tracing**: Structured logging
//!
//! ## Core Components
//!
//! - [`config`]: Application configuration management
//! - [`db`]: Database schema initialization
//! - [`error`]: Centralized error handling and HTTP error responses
//! - [`forms`]: Declarative form validation engine
//! - [`middleware`]: The interceptor chains (recovery, logging, security
//!   headers, sessions, CSRF, authentication)
//! - [`models`]: Domain types and repositories
//! - [`routes`]: HTTP endpoint handlers and router assembly
//! - [`session`]: Server-side session store with flash semantics
//! - [`state`]: Shared application state
//! - [`templates`]: Pure HTML page rendering

pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod session;
pub mod state;
pub mod templates;

#[cfg(test)]
mod tests;
