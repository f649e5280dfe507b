//! # triage_core
//!
//! Core domain logic for Triage: domain models, the role-permission
//! evaluator, password hashing, token issuing/verification, and the
//! storage port with its PostgreSQL and in-memory backends.

pub mod auth;
pub mod authz;
pub mod migrate;
pub mod models;
pub mod store;
pub mod uuid;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
