//! Service layer: permission checks and orchestration over the store.

pub mod auth;
pub mod comments;
pub mod cookies;
pub mod issues;
pub mod users;

/// Client-supplied ids must be uuids. Anything else can never match a row,
/// so callers treat it as absent without asking the database.
pub(crate) fn is_valid_id(id: &str) -> bool {
    uuid::Uuid::try_parse(id).is_ok()
}
