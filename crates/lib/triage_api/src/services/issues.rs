//! Issue operations behind permission checks.

use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::{CreateIssueRequest, UpdateIssueRequest};
use crate::services::is_valid_id;
use triage_core::authz::{AccessContext, Action, Resource, can_perform};
use triage_core::models::{Issue, User};
use triage_core::store::{IssuePatch, NewIssue, Store};

pub async fn list_issues(store: &dyn Store, actor: &User) -> AppResult<Vec<Issue>> {
    ensure_can_read(actor)?;
    Ok(store.list_issues().await?)
}

pub async fn issues_page(
    store: &dyn Store,
    actor: &User,
    page: u32,
    limit: u32,
) -> AppResult<Vec<Issue>> {
    ensure_can_read(actor)?;
    Ok(store.issues_page(page, limit).await?)
}

pub async fn get_issue(store: &dyn Store, actor: &User, issue_id: &str) -> AppResult<Issue> {
    ensure_can_read(actor)?;
    load_issue(store, issue_id).await
}

/// Issues the given user authored or is assigned to.
pub async fn issues_by_user(store: &dyn Store, actor: &User, user_id: &str) -> AppResult<Vec<Issue>> {
    ensure_can_read(actor)?;
    if !is_valid_id(user_id) {
        return Ok(Vec::new());
    }
    Ok(store.issues_by_user(user_id).await?)
}

pub async fn issues_by_user_page(
    store: &dyn Store,
    actor: &User,
    user_id: &str,
    page: u32,
    limit: u32,
) -> AppResult<Vec<Issue>> {
    ensure_can_read(actor)?;
    if !is_valid_id(user_id) {
        return Ok(Vec::new());
    }
    Ok(store.issues_by_user_page(user_id, page, limit).await?)
}

pub async fn create_issue(
    store: &dyn Store,
    actor: &User,
    req: CreateIssueRequest,
) -> AppResult<Issue> {
    let ctx = AccessContext::new(&actor.id).creation();
    if !can_perform(actor.role, Resource::Issues, Action::Write, &ctx) {
        return Err(AppError::PermissionDenied);
    }
    if req.title.trim().is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }
    if req.description.trim().is_empty() {
        return Err(AppError::Validation("Description is required".to_string()));
    }
    check_assignee(store, req.assignee_id.as_deref()).await?;

    let issue = store
        .create_issue(NewIssue {
            title: req.title,
            description: req.description,
            priority: req.priority,
            kind: req.kind,
            status: req.status,
            image: req.image,
            author_id: actor.id.clone(),
            assignee_id: req.assignee_id,
        })
        .await?;
    info!(issue_id = %issue.id, author_id = %actor.id, "issue created");
    Ok(issue)
}

/// The author, the assignee and admins may update an issue.
pub async fn update_issue(
    store: &dyn Store,
    actor: &User,
    issue_id: &str,
    req: UpdateIssueRequest,
) -> AppResult<Issue> {
    let existing = load_issue(store, issue_id).await?;
    let ctx = AccessContext::new(&actor.id)
        .owned_by(&existing.author_id)
        .assigned_to(existing.assignee_id.as_deref());
    if !can_perform(actor.role, Resource::Issues, Action::Write, &ctx) {
        return Err(AppError::PermissionDenied);
    }
    if let Some(title) = &req.title
        && title.trim().is_empty()
    {
        return Err(AppError::Validation("Title is required".to_string()));
    }
    check_assignee(store, req.assignee_id.as_deref()).await?;

    let patch = IssuePatch {
        title: req.title,
        description: req.description,
        priority: req.priority,
        kind: req.kind,
        status: req.status,
        image: req.image,
        assignee_id: req.assignee_id,
    };
    store
        .update_issue(issue_id, patch)
        .await?
        .ok_or_else(issue_not_found)
}

/// Only the author and admins may delete an issue; assignment grants no
/// delete right. The deleted issue is returned.
pub async fn delete_issue(store: &dyn Store, actor: &User, issue_id: &str) -> AppResult<Issue> {
    let existing = load_issue(store, issue_id).await?;
    let ctx = AccessContext::new(&actor.id).owned_by(&existing.author_id);
    if !can_perform(actor.role, Resource::Issues, Action::Delete, &ctx) {
        return Err(AppError::PermissionDenied);
    }
    store.delete_issue(issue_id).await?;
    info!(issue_id = %issue_id, actor_id = %actor.id, "issue deleted");
    Ok(existing)
}

pub(crate) async fn load_issue(store: &dyn Store, issue_id: &str) -> AppResult<Issue> {
    if !is_valid_id(issue_id) {
        return Err(issue_not_found());
    }
    store.issue_by_id(issue_id).await?.ok_or_else(issue_not_found)
}

fn issue_not_found() -> AppError {
    AppError::NotFound("Issue doesn't exist".to_string())
}

fn ensure_can_read(actor: &User) -> AppResult<()> {
    let ctx = AccessContext::new(&actor.id);
    if !can_perform(actor.role, Resource::Issues, Action::Read, &ctx) {
        return Err(AppError::PermissionDenied);
    }
    Ok(())
}

async fn check_assignee(store: &dyn Store, assignee_id: Option<&str>) -> AppResult<()> {
    let Some(assignee_id) = assignee_id else {
        return Ok(());
    };
    if !is_valid_id(assignee_id) || store.user_by_id(assignee_id).await?.is_none() {
        return Err(AppError::NotFound("Assignee doesn't exist".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_core::models::Role;
    use triage_core::store::MemoryStore;

    async fn seed_user(store: &MemoryStore, email: &str, role: Role) -> User {
        use triage_core::store::UserStore;
        store.create_user(email, "not-a-real-hash", role).await.unwrap()
    }

    fn new_issue_req(title: &str) -> CreateIssueRequest {
        CreateIssueRequest {
            title: title.to_string(),
            description: "details".to_string(),
            priority: None,
            kind: None,
            status: None,
            image: None,
            assignee_id: None,
        }
    }

    #[tokio::test]
    async fn stakeholder_cannot_create_but_can_read() {
        let store = MemoryStore::default();
        let author = seed_user(&store, "author@example.com", Role::User).await;
        let viewer = seed_user(&store, "viewer@example.com", Role::Stakeholder).await;

        let issue = create_issue(&store, &author, new_issue_req("One")).await.unwrap();

        let err = create_issue(&store, &viewer, new_issue_req("Two")).await;
        assert!(matches!(err, Err(AppError::PermissionDenied)));

        let seen = get_issue(&store, &viewer, &issue.id).await.unwrap();
        assert_eq!(seen.id, issue.id);
    }

    #[tokio::test]
    async fn update_requires_authorship_or_assignment() {
        let store = MemoryStore::default();
        let author = seed_user(&store, "a@example.com", Role::User).await;
        let assignee = seed_user(&store, "b@example.com", Role::User).await;
        let outsider = seed_user(&store, "c@example.com", Role::User).await;

        let mut req = new_issue_req("Login broken");
        req.assignee_id = Some(assignee.id.clone());
        let issue = create_issue(&store, &author, req).await.unwrap();

        let denied = update_issue(
            &store,
            &outsider,
            &issue.id,
            UpdateIssueRequest {
                title: Some("hijacked".to_string()),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(denied, Err(AppError::PermissionDenied)));

        let updated = update_issue(
            &store,
            &assignee,
            &issue.id,
            UpdateIssueRequest {
                description: Some("triaged".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.description, "triaged");
    }

    #[tokio::test]
    async fn assignee_cannot_delete_but_author_and_admin_can() {
        let store = MemoryStore::default();
        let author = seed_user(&store, "a@example.com", Role::User).await;
        let assignee = seed_user(&store, "b@example.com", Role::User).await;
        let admin = seed_user(&store, "root@example.com", Role::Admin).await;

        let mut req = new_issue_req("First");
        req.assignee_id = Some(assignee.id.clone());
        let first = create_issue(&store, &author, req).await.unwrap();

        let denied = delete_issue(&store, &assignee, &first.id).await;
        assert!(matches!(denied, Err(AppError::PermissionDenied)));

        let deleted = delete_issue(&store, &author, &first.id).await.unwrap();
        assert_eq!(deleted.id, first.id);

        let second = create_issue(&store, &author, new_issue_req("Second")).await.unwrap();
        delete_issue(&store, &admin, &second.id).await.unwrap();
        let err = get_issue(&store, &admin, &second.id).await;
        assert!(matches!(err, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn unknown_assignee_is_rejected() {
        let store = MemoryStore::default();
        let author = seed_user(&store, "a@example.com", Role::User).await;

        let mut req = new_issue_req("Unassignable");
        req.assignee_id = Some("33333333-3333-3333-3333-333333333333".to_string());
        let err = create_issue(&store, &author, req).await;
        assert!(matches!(err, Err(AppError::NotFound(_))));

        // Malformed ids get the same answer as missing users.
        let mut req = new_issue_req("Unassignable");
        req.assignee_id = Some("not-a-uuid".to_string());
        let err = create_issue(&store, &author, req).await;
        assert!(matches!(err, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn malformed_issue_id_reads_as_missing() {
        let store = MemoryStore::default();
        let actor = seed_user(&store, "a@example.com", Role::User).await;

        let err = get_issue(&store, &actor, "definitely-not-a-uuid").await;
        assert!(matches!(err, Err(AppError::NotFound(_))));

        // A malformed user id filters to an empty listing, not an error.
        let issues = issues_by_user(&store, &actor, "nope").await.unwrap();
        assert!(issues.is_empty());
    }
}
