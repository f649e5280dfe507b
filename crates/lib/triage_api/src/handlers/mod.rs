//! HTTP handlers, one module per resource.
//!
//! Handlers stay thin: extract, call the service, wrap the payload in
//! [`crate::models::ApiResponse`].

pub mod auth;
pub mod comments;
pub mod issues;
pub mod users;
