//! Comment operations behind permission checks.

use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::{CreateCommentRequest, UpdateCommentRequest};
use crate::services::is_valid_id;
use triage_core::authz::{AccessContext, Action, Resource, can_perform};
use triage_core::models::{Comment, User};
use triage_core::store::{NewComment, Store};

pub async fn list_comments(store: &dyn Store, actor: &User) -> AppResult<Vec<Comment>> {
    ensure_can_read(actor)?;
    Ok(store.list_comments().await?)
}

pub async fn get_comment(store: &dyn Store, actor: &User, comment_id: &str) -> AppResult<Comment> {
    ensure_can_read(actor)?;
    load_comment(store, comment_id).await
}

/// Comments on an issue, newest first. An unknown issue is an empty listing.
pub async fn comments_by_issue(
    store: &dyn Store,
    actor: &User,
    issue_id: &str,
) -> AppResult<Vec<Comment>> {
    ensure_can_read(actor)?;
    if !is_valid_id(issue_id) {
        return Ok(Vec::new());
    }
    Ok(store.comments_by_issue(issue_id).await?)
}

/// Any commenting role may comment on any issue it can read; authorship is
/// taken from the session, not the request body.
pub async fn create_comment(
    store: &dyn Store,
    actor: &User,
    req: CreateCommentRequest,
) -> AppResult<Comment> {
    let ctx = AccessContext::new(&actor.id).creation();
    if !can_perform(actor.role, Resource::Comments, Action::Write, &ctx) {
        return Err(AppError::PermissionDenied);
    }
    if req.comment.trim().is_empty() {
        return Err(AppError::Validation("Comment text is required".to_string()));
    }
    if !is_valid_id(&req.issue_id) || store.issue_by_id(&req.issue_id).await?.is_none() {
        return Err(AppError::NotFound("Issue doesn't exist".to_string()));
    }

    let comment = store
        .create_comment(NewComment {
            body: req.comment,
            author_id: actor.id.clone(),
            issue_id: req.issue_id,
        })
        .await?;
    info!(comment_id = %comment.id, issue_id = %comment.issue_id, "comment created");
    Ok(comment)
}

/// Only the comment's author and admins may edit it.
pub async fn update_comment(
    store: &dyn Store,
    actor: &User,
    comment_id: &str,
    req: UpdateCommentRequest,
) -> AppResult<Comment> {
    let existing = load_comment(store, comment_id).await?;
    let ctx = AccessContext::new(&actor.id).owned_by(&existing.author_id);
    if !can_perform(actor.role, Resource::Comments, Action::Write, &ctx) {
        return Err(AppError::PermissionDenied);
    }
    let Some(body) = req.comment else {
        return Ok(existing);
    };
    if body.trim().is_empty() {
        return Err(AppError::Validation("Comment text is required".to_string()));
    }
    store
        .update_comment(comment_id, &body)
        .await?
        .ok_or_else(comment_not_found)
}

/// Only the comment's author and admins may delete it. The deleted comment
/// is returned.
pub async fn delete_comment(
    store: &dyn Store,
    actor: &User,
    comment_id: &str,
) -> AppResult<Comment> {
    let existing = load_comment(store, comment_id).await?;
    let ctx = AccessContext::new(&actor.id).owned_by(&existing.author_id);
    if !can_perform(actor.role, Resource::Comments, Action::Delete, &ctx) {
        return Err(AppError::PermissionDenied);
    }
    store.delete_comment(comment_id).await?;
    info!(comment_id = %comment_id, actor_id = %actor.id, "comment deleted");
    Ok(existing)
}

async fn load_comment(store: &dyn Store, comment_id: &str) -> AppResult<Comment> {
    if !is_valid_id(comment_id) {
        return Err(comment_not_found());
    }
    store.comment_by_id(comment_id).await?.ok_or_else(comment_not_found)
}

fn comment_not_found() -> AppError {
    AppError::NotFound("Comment doesn't exist".to_string())
}

fn ensure_can_read(actor: &User) -> AppResult<()> {
    let ctx = AccessContext::new(&actor.id);
    if !can_perform(actor.role, Resource::Comments, Action::Read, &ctx) {
        return Err(AppError::PermissionDenied);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateIssueRequest;
    use crate::services::issues;
    use triage_core::models::{Issue, Role};
    use triage_core::store::MemoryStore;

    async fn seed_user(store: &MemoryStore, email: &str, role: Role) -> User {
        use triage_core::store::UserStore;
        store.create_user(email, "not-a-real-hash", role).await.unwrap()
    }

    async fn seed_issue(store: &MemoryStore, author: &User) -> Issue {
        issues::create_issue(
            store,
            author,
            CreateIssueRequest {
                title: "Host unreachable".to_string(),
                description: "Ping times out".to_string(),
                priority: None,
                kind: None,
                status: None,
                image: None,
                assignee_id: None,
            },
        )
        .await
        .unwrap()
    }

    fn comment_req(issue_id: &str, text: &str) -> CreateCommentRequest {
        CreateCommentRequest {
            comment: text.to_string(),
            issue_id: issue_id.to_string(),
        }
    }

    #[tokio::test]
    async fn any_user_can_comment_on_any_issue() {
        let store = MemoryStore::default();
        let author = seed_user(&store, "a@example.com", Role::User).await;
        let other = seed_user(&store, "b@example.com", Role::User).await;
        let issue = seed_issue(&store, &author).await;

        // Commenting is a creation, so owning the issue is not required.
        let comment = create_comment(&store, &other, comment_req(&issue.id, "Same here"))
            .await
            .unwrap();
        assert_eq!(comment.author_id, other.id);
        assert_eq!(comment.issue_id, issue.id);
    }

    #[tokio::test]
    async fn stakeholder_cannot_comment() {
        let store = MemoryStore::default();
        let author = seed_user(&store, "a@example.com", Role::User).await;
        let viewer = seed_user(&store, "v@example.com", Role::Stakeholder).await;
        let issue = seed_issue(&store, &author).await;

        let err = create_comment(&store, &viewer, comment_req(&issue.id, "No")).await;
        assert!(matches!(err, Err(AppError::PermissionDenied)));

        let listed = comments_by_issue(&store, &viewer, &issue.id).await.unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn commenting_on_a_missing_issue_fails() {
        let store = MemoryStore::default();
        let user = seed_user(&store, "a@example.com", Role::User).await;

        let absent = comment_req("44444444-4444-4444-4444-444444444444", "Hello?");
        let err = create_comment(&store, &user, absent).await;
        assert!(matches!(err, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn only_the_author_or_admin_touches_a_comment() {
        let store = MemoryStore::default();
        let author = seed_user(&store, "a@example.com", Role::User).await;
        let other = seed_user(&store, "b@example.com", Role::User).await;
        let admin = seed_user(&store, "root@example.com", Role::Admin).await;
        let issue = seed_issue(&store, &author).await;

        let comment = create_comment(&store, &author, comment_req(&issue.id, "First"))
            .await
            .unwrap();

        let denied = update_comment(
            &store,
            &other,
            &comment.id,
            UpdateCommentRequest {
                comment: Some("Edited".to_string()),
            },
        )
        .await;
        assert!(matches!(denied, Err(AppError::PermissionDenied)));

        let denied = delete_comment(&store, &other, &comment.id).await;
        assert!(matches!(denied, Err(AppError::PermissionDenied)));

        let edited = update_comment(
            &store,
            &admin,
            &comment.id,
            UpdateCommentRequest {
                comment: Some("Moderated".to_string()),
            },
        )
        .await
        .unwrap();
        assert_eq!(edited.body, "Moderated");

        delete_comment(&store, &admin, &comment.id).await.unwrap();
        let err = get_comment(&store, &admin, &comment.id).await;
        assert!(matches!(err, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_without_text_returns_the_comment_unchanged() {
        let store = MemoryStore::default();
        let author = seed_user(&store, "a@example.com", Role::User).await;
        let issue = seed_issue(&store, &author).await;
        let comment = create_comment(&store, &author, comment_req(&issue.id, "Keep me"))
            .await
            .unwrap();

        let unchanged = update_comment(&store, &author, &comment.id, UpdateCommentRequest::default())
            .await
            .unwrap();
        assert_eq!(unchanged.body, "Keep me");
    }
}
