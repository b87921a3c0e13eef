//! Integration tests for the request-processing pipeline.
//!
//! ## Test Modules
//!
//! - **api_tests**: End-to-end flows over the full router (signup, login,
//!   snippet lifecycle, flash messages)
//! - **middleware_tests**: Interceptor behavior in isolation (CSRF
//!   short-circuit, require-auth redirect, panic recovery, security headers)
//! - **router_tests**: Route precedence, 405/Allow, static files
//!
//! Unit tests for the validation engine, the session store and individual
//! interceptor helpers live next to their modules.

pub mod common;

pub mod api_tests;
