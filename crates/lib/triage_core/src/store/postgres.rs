//! PostgreSQL storage backend.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{
    CommentStore, IssuePatch, IssueStore, NewComment, NewIssue, StoreError, StoreResult,
    UserPatch, UserStore,
};
use crate::models::{Comment, Issue, IssueKind, IssueStatus, Priority, Role, User};
use crate::uuid::uuidv7;

/// Storage backend over a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

type UserRow = (
    String,
    String,
    String,
    String,
    Option<String>,
    chrono::DateTime<chrono::Utc>,
);

fn user_from_row(row: UserRow) -> StoreResult<User> {
    let (id, email, password_hash, role, refresh_token_hash, created_at) = row;
    let role = Role::parse(&role)
        .ok_or_else(|| StoreError::Corrupt(format!("unknown role: {role}")))?;
    Ok(User {
        id,
        email,
        password_hash,
        role,
        refresh_token_hash,
        created_at,
    })
}

type IssueRow = (
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    String,
    Option<String>,
    String,
    Option<String>,
    chrono::DateTime<chrono::Utc>,
);

fn issue_from_row(row: IssueRow) -> StoreResult<Issue> {
    let (id, title, description, priority, kind, status, image, author_id, assignee_id, created_at) =
        row;
    let priority = priority
        .map(|p| {
            Priority::parse(&p).ok_or_else(|| StoreError::Corrupt(format!("unknown priority: {p}")))
        })
        .transpose()?;
    let kind = kind
        .map(|k| {
            IssueKind::parse(&k)
                .ok_or_else(|| StoreError::Corrupt(format!("unknown issue type: {k}")))
        })
        .transpose()?;
    let status = IssueStatus::parse(&status)
        .ok_or_else(|| StoreError::Corrupt(format!("unknown status: {status}")))?;
    Ok(Issue {
        id,
        title,
        description,
        priority,
        kind,
        status,
        image,
        author_id,
        assignee_id,
        created_at,
    })
}

type CommentRow = (String, String, String, String, chrono::DateTime<chrono::Utc>);

fn comment_from_row(row: CommentRow) -> Comment {
    let (id, body, author_id, issue_id, created_at) = row;
    Comment {
        id,
        body,
        author_id,
        issue_id,
        created_at,
    }
}

/// Map a unique-constraint violation to [`StoreError::Conflict`].
fn conflict_on_unique(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict("email already registered".into())
        }
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> StoreResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (email, password_hash, role) \
             VALUES ($1, $2, $3::user_role) \
             RETURNING id::text, email, password_hash, role::text, refresh_token_hash, created_at",
        )
        .bind(email)
        .bind(password_hash)
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(conflict_on_unique)?;
        user_from_row(row)
    }

    async fn user_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id::text, email, password_hash, role::text, refresh_token_hash, created_at \
             FROM users WHERE id = $1::uuid",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(user_from_row).transpose()
    }

    async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id::text, email, password_hash, role::text, refresh_token_hash, created_at \
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        row.map(user_from_row).transpose()
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id::text, email, password_hash, role::text, refresh_token_hash, created_at \
             FROM users ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(user_from_row).collect()
    }

    async fn update_user(&self, id: &str, patch: UserPatch) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "UPDATE users SET \
               email = COALESCE($2, email), \
               password_hash = COALESCE($3, password_hash), \
               role = COALESCE($4::user_role, role) \
             WHERE id = $1::uuid \
             RETURNING id::text, email, password_hash, role::text, refresh_token_hash, created_at",
        )
        .bind(id)
        .bind(patch.email)
        .bind(patch.password_hash)
        .bind(patch.role.map(|r| r.as_str()))
        .fetch_optional(&self.pool)
        .await
        .map_err(conflict_on_unique)?;
        row.map(user_from_row).transpose()
    }

    async fn delete_user(&self, id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1::uuid")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_refresh_token(&self, id: &str, digest: Option<&str>) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE users SET refresh_token_hash = $2 WHERE id = $1::uuid")
            .bind(id)
            .bind(digest)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl IssueStore for PgStore {
    async fn create_issue(&self, new: NewIssue) -> StoreResult<Issue> {
        let row = sqlx::query_as::<_, IssueRow>(
            "INSERT INTO issues \
               (id, title, description, priority, kind, status, image, author_id, assignee_id) \
             VALUES ($1::uuid, $2, $3, $4::issue_priority, $5::issue_kind, $6::issue_status, $7, \
                     $8::uuid, $9::uuid) \
             RETURNING id::text, title, description, priority::text, kind::text, status::text, \
                       image, author_id::text, assignee_id::text, created_at",
        )
        .bind(uuidv7())
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.priority.map(|p| p.as_str()))
        .bind(new.kind.map(|k| k.as_str()))
        .bind(new.status.unwrap_or_default().as_str())
        .bind(&new.image)
        .bind(&new.author_id)
        .bind(&new.assignee_id)
        .fetch_one(&self.pool)
        .await?;
        issue_from_row(row)
    }

    async fn issue_by_id(&self, id: &str) -> StoreResult<Option<Issue>> {
        let row = sqlx::query_as::<_, IssueRow>(
            "SELECT id::text, title, description, priority::text, kind::text, status::text, \
                    image, author_id::text, assignee_id::text, created_at \
             FROM issues WHERE id = $1::uuid",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(issue_from_row).transpose()
    }

    async fn list_issues(&self) -> StoreResult<Vec<Issue>> {
        let rows = sqlx::query_as::<_, IssueRow>(
            "SELECT id::text, title, description, priority::text, kind::text, status::text, \
                    image, author_id::text, assignee_id::text, created_at \
             FROM issues ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(issue_from_row).collect()
    }

    async fn issues_page(&self, page: u32, limit: u32) -> StoreResult<Vec<Issue>> {
        let skip = i64::from(page.max(1) - 1).saturating_mul(i64::from(limit));
        let rows = sqlx::query_as::<_, IssueRow>(
            "SELECT id::text, title, description, priority::text, kind::text, status::text, \
                    image, author_id::text, assignee_id::text, created_at \
             FROM issues ORDER BY created_at, id LIMIT $1 OFFSET $2",
        )
        .bind(i64::from(limit))
        .bind(skip)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(issue_from_row).collect()
    }

    async fn issues_by_user(&self, user_id: &str) -> StoreResult<Vec<Issue>> {
        let rows = sqlx::query_as::<_, IssueRow>(
            "SELECT id::text, title, description, priority::text, kind::text, status::text, \
                    image, author_id::text, assignee_id::text, created_at \
             FROM issues WHERE author_id = $1::uuid OR assignee_id = $1::uuid \
             ORDER BY created_at, id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(issue_from_row).collect()
    }

    async fn issues_by_user_page(
        &self,
        user_id: &str,
        page: u32,
        limit: u32,
    ) -> StoreResult<Vec<Issue>> {
        let skip = i64::from(page.max(1) - 1).saturating_mul(i64::from(limit));
        let rows = sqlx::query_as::<_, IssueRow>(
            "SELECT id::text, title, description, priority::text, kind::text, status::text, \
                    image, author_id::text, assignee_id::text, created_at \
             FROM issues WHERE author_id = $1::uuid OR assignee_id = $1::uuid \
             ORDER BY created_at, id LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(i64::from(limit))
        .bind(skip)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(issue_from_row).collect()
    }

    async fn update_issue(&self, id: &str, patch: IssuePatch) -> StoreResult<Option<Issue>> {
        let row = sqlx::query_as::<_, IssueRow>(
            "UPDATE issues SET \
               title = COALESCE($2, title), \
               description = COALESCE($3, description), \
               priority = COALESCE($4::issue_priority, priority), \
               kind = COALESCE($5::issue_kind, kind), \
               status = COALESCE($6::issue_status, status), \
               image = COALESCE($7, image), \
               assignee_id = COALESCE($8::uuid, assignee_id) \
             WHERE id = $1::uuid \
             RETURNING id::text, title, description, priority::text, kind::text, status::text, \
                       image, author_id::text, assignee_id::text, created_at",
        )
        .bind(id)
        .bind(patch.title)
        .bind(patch.description)
        .bind(patch.priority.map(|p| p.as_str()))
        .bind(patch.kind.map(|k| k.as_str()))
        .bind(patch.status.map(|s| s.as_str()))
        .bind(patch.image)
        .bind(patch.assignee_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(issue_from_row).transpose()
    }

    async fn delete_issue(&self, id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM issues WHERE id = $1::uuid")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CommentStore for PgStore {
    async fn create_comment(&self, new: NewComment) -> StoreResult<Comment> {
        let row = sqlx::query_as::<_, CommentRow>(
            "INSERT INTO comments (id, body, author_id, issue_id) \
             VALUES ($1::uuid, $2, $3::uuid, $4::uuid) \
             RETURNING id::text, body, author_id::text, issue_id::text, created_at",
        )
        .bind(uuidv7())
        .bind(&new.body)
        .bind(&new.author_id)
        .bind(&new.issue_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(comment_from_row(row))
    }

    async fn comment_by_id(&self, id: &str) -> StoreResult<Option<Comment>> {
        let row = sqlx::query_as::<_, CommentRow>(
            "SELECT id::text, body, author_id::text, issue_id::text, created_at \
             FROM comments WHERE id = $1::uuid",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(comment_from_row))
    }

    async fn list_comments(&self) -> StoreResult<Vec<Comment>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            "SELECT id::text, body, author_id::text, issue_id::text, created_at \
             FROM comments ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(comment_from_row).collect())
    }

    async fn comments_by_issue(&self, issue_id: &str) -> StoreResult<Vec<Comment>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            "SELECT id::text, body, author_id::text, issue_id::text, created_at \
             FROM comments WHERE issue_id = $1::uuid ORDER BY created_at DESC, id DESC",
        )
        .bind(issue_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(comment_from_row).collect())
    }

    async fn update_comment(&self, id: &str, body: &str) -> StoreResult<Option<Comment>> {
        let row = sqlx::query_as::<_, CommentRow>(
            "UPDATE comments SET body = $2 WHERE id = $1::uuid \
             RETURNING id::text, body, author_id::text, issue_id::text, created_at",
        )
        .bind(id)
        .bind(body)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(comment_from_row))
    }

    async fn delete_comment(&self, id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1::uuid")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
