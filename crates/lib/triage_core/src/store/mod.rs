//! The storage port.
//!
//! Handlers and services talk to storage only through these traits, injected
//! as an `Arc<dyn Store>` at startup. [`postgres::PgStore`] is the production
//! backend; [`memory::MemoryStore`] backs tests and local runs without a
//! database.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Comment, Issue, IssueKind, IssueStatus, Priority, Role, User};

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint was violated (duplicate email).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A stored value failed to parse into its domain type.
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Input for creating an issue. Id and timestamp are store-assigned.
#[derive(Debug, Clone)]
pub struct NewIssue {
    pub title: String,
    pub description: String,
    pub priority: Option<Priority>,
    pub kind: Option<IssueKind>,
    /// Defaults to [`IssueStatus::ToDo`] when absent.
    pub status: Option<IssueStatus>,
    pub image: Option<String>,
    pub author_id: String,
    pub assignee_id: Option<String>,
}

/// Input for creating a comment. Id and timestamp are store-assigned.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub body: String,
    pub author_id: String,
    pub issue_id: String,
}

/// Field-level patch for an issue update. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct IssuePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub kind: Option<IssueKind>,
    pub status: Option<IssueStatus>,
    pub image: Option<String>,
    pub assignee_id: Option<String>,
}

/// Field-level patch for a user update. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
}

/// User persistence.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a user. A duplicate email is [`StoreError::Conflict`].
    async fn create_user(&self, email: &str, password_hash: &str, role: Role)
    -> StoreResult<User>;

    async fn user_by_id(&self, id: &str) -> StoreResult<Option<User>>;

    async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn list_users(&self) -> StoreResult<Vec<User>>;

    /// Apply a partial update. `None` when the user does not exist.
    async fn update_user(&self, id: &str, patch: UserPatch) -> StoreResult<Option<User>>;

    /// Returns whether a row was deleted.
    async fn delete_user(&self, id: &str) -> StoreResult<bool>;

    /// Replace the stored refresh-token digest (or clear it with `None`) in
    /// a single write. Returns whether the user exists.
    async fn set_refresh_token(&self, id: &str, digest: Option<&str>) -> StoreResult<bool>;
}

/// Issue persistence.
#[async_trait]
pub trait IssueStore: Send + Sync {
    async fn create_issue(&self, new: NewIssue) -> StoreResult<Issue>;

    async fn issue_by_id(&self, id: &str) -> StoreResult<Option<Issue>>;

    async fn list_issues(&self) -> StoreResult<Vec<Issue>>;

    /// Page of issues; `page` counts from 1.
    async fn issues_page(&self, page: u32, limit: u32) -> StoreResult<Vec<Issue>>;

    /// Issues the user authored or is assigned to.
    async fn issues_by_user(&self, user_id: &str) -> StoreResult<Vec<Issue>>;

    async fn issues_by_user_page(
        &self,
        user_id: &str,
        page: u32,
        limit: u32,
    ) -> StoreResult<Vec<Issue>>;

    async fn update_issue(&self, id: &str, patch: IssuePatch) -> StoreResult<Option<Issue>>;

    async fn delete_issue(&self, id: &str) -> StoreResult<bool>;
}

/// Comment persistence.
#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn create_comment(&self, new: NewComment) -> StoreResult<Comment>;

    async fn comment_by_id(&self, id: &str) -> StoreResult<Option<Comment>>;

    async fn list_comments(&self) -> StoreResult<Vec<Comment>>;

    /// Comments on an issue, newest first.
    async fn comments_by_issue(&self, issue_id: &str) -> StoreResult<Vec<Comment>>;

    async fn update_comment(&self, id: &str, body: &str) -> StoreResult<Option<Comment>>;

    async fn delete_comment(&self, id: &str) -> StoreResult<bool>;
}

/// The full storage port.
pub trait Store: UserStore + IssueStore + CommentStore {}

impl<T: UserStore + IssueStore + CommentStore> Store for T {}
