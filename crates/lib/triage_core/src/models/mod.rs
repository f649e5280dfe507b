//! Domain models shared across the API layer and the storage backends.

pub mod comment;
pub mod issue;
pub mod user;

pub use comment::Comment;
pub use issue::{Issue, IssueKind, IssueStatus, Priority};
pub use user::{Role, SafeUser, User};
