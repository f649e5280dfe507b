//! In-memory storage backend.
//!
//! Keeps every table in a `HashMap` behind an `RwLock`. Backs the test
//! suites and database-free local runs; not meant for production data.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;

use super::{
    CommentStore, IssuePatch, IssueStore, NewComment, NewIssue, StoreError, StoreResult,
    UserPatch, UserStore,
};
use crate::models::{Comment, Issue, Role, User};
use crate::uuid::uuidv7;

/// In-memory store. Cloning shares the underlying tables.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    users: Arc<RwLock<HashMap<String, User>>>,
    issues: Arc<RwLock<HashMap<String, Issue>>>,
    comments: Arc<RwLock<HashMap<String, Comment>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_poisoned() -> StoreError {
    StoreError::Internal("store lock poisoned".into())
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> StoreResult<User> {
        let mut users = self.users.write().map_err(|_| lock_poisoned())?;
        if users.values().any(|u| u.email == email) {
            return Err(StoreError::Conflict("email already registered".into()));
        }
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            role,
            refresh_token_hash: None,
            created_at: Utc::now(),
        };
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn user_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().map_err(|_| lock_poisoned())?;
        Ok(users.get(id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().map_err(|_| lock_poisoned())?;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let users = self.users.read().map_err(|_| lock_poisoned())?;
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn update_user(&self, id: &str, patch: UserPatch) -> StoreResult<Option<User>> {
        let mut users = self.users.write().map_err(|_| lock_poisoned())?;
        if let Some(new_email) = &patch.email
            && users.values().any(|u| u.id != id && u.email == *new_email)
        {
            return Err(StoreError::Conflict("email already registered".into()));
        }
        let Some(user) = users.get_mut(id) else {
            return Ok(None);
        };
        if let Some(email) = patch.email {
            user.email = email;
        }
        if let Some(password_hash) = patch.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(role) = patch.role {
            user.role = role;
        }
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: &str) -> StoreResult<bool> {
        let mut users = self.users.write().map_err(|_| lock_poisoned())?;
        Ok(users.remove(id).is_some())
    }

    async fn set_refresh_token(&self, id: &str, digest: Option<&str>) -> StoreResult<bool> {
        let mut users = self.users.write().map_err(|_| lock_poisoned())?;
        let Some(user) = users.get_mut(id) else {
            return Ok(false);
        };
        user.refresh_token_hash = digest.map(|d| d.to_string());
        Ok(true)
    }
}

#[async_trait]
impl IssueStore for MemoryStore {
    async fn create_issue(&self, new: NewIssue) -> StoreResult<Issue> {
        let issue = Issue {
            id: uuidv7().to_string(),
            title: new.title,
            description: new.description,
            priority: new.priority,
            kind: new.kind,
            status: new.status.unwrap_or_default(),
            image: new.image,
            author_id: new.author_id,
            assignee_id: new.assignee_id,
            created_at: Utc::now(),
        };
        let mut issues = self.issues.write().map_err(|_| lock_poisoned())?;
        issues.insert(issue.id.clone(), issue.clone());
        Ok(issue)
    }

    async fn issue_by_id(&self, id: &str) -> StoreResult<Option<Issue>> {
        let issues = self.issues.read().map_err(|_| lock_poisoned())?;
        Ok(issues.get(id).cloned())
    }

    async fn list_issues(&self) -> StoreResult<Vec<Issue>> {
        let issues = self.issues.read().map_err(|_| lock_poisoned())?;
        Ok(sorted(issues.values().cloned().collect()))
    }

    async fn issues_page(&self, page: u32, limit: u32) -> StoreResult<Vec<Issue>> {
        let all = self.list_issues().await?;
        Ok(paginate(all, page, limit))
    }

    async fn issues_by_user(&self, user_id: &str) -> StoreResult<Vec<Issue>> {
        let issues = self.issues.read().map_err(|_| lock_poisoned())?;
        let matching = issues
            .values()
            .filter(|i| i.author_id == user_id || i.assignee_id.as_deref() == Some(user_id))
            .cloned()
            .collect();
        Ok(sorted(matching))
    }

    async fn issues_by_user_page(
        &self,
        user_id: &str,
        page: u32,
        limit: u32,
    ) -> StoreResult<Vec<Issue>> {
        let matching = self.issues_by_user(user_id).await?;
        Ok(paginate(matching, page, limit))
    }

    async fn update_issue(&self, id: &str, patch: IssuePatch) -> StoreResult<Option<Issue>> {
        let mut issues = self.issues.write().map_err(|_| lock_poisoned())?;
        let Some(issue) = issues.get_mut(id) else {
            return Ok(None);
        };
        if let Some(title) = patch.title {
            issue.title = title;
        }
        if let Some(description) = patch.description {
            issue.description = description;
        }
        if let Some(priority) = patch.priority {
            issue.priority = Some(priority);
        }
        if let Some(kind) = patch.kind {
            issue.kind = Some(kind);
        }
        if let Some(status) = patch.status {
            issue.status = status;
        }
        if let Some(image) = patch.image {
            issue.image = Some(image);
        }
        if let Some(assignee_id) = patch.assignee_id {
            issue.assignee_id = Some(assignee_id);
        }
        Ok(Some(issue.clone()))
    }

    async fn delete_issue(&self, id: &str) -> StoreResult<bool> {
        let mut issues = self.issues.write().map_err(|_| lock_poisoned())?;
        let removed = issues.remove(id).is_some();
        if removed {
            // Mirror the database's cascade.
            let mut comments = self.comments.write().map_err(|_| lock_poisoned())?;
            comments.retain(|_, c| c.issue_id != id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn create_comment(&self, new: NewComment) -> StoreResult<Comment> {
        let comment = Comment {
            id: uuidv7().to_string(),
            body: new.body,
            author_id: new.author_id,
            issue_id: new.issue_id,
            created_at: Utc::now(),
        };
        let mut comments = self.comments.write().map_err(|_| lock_poisoned())?;
        comments.insert(comment.id.clone(), comment.clone());
        Ok(comment)
    }

    async fn comment_by_id(&self, id: &str) -> StoreResult<Option<Comment>> {
        let comments = self.comments.read().map_err(|_| lock_poisoned())?;
        Ok(comments.get(id).cloned())
    }

    async fn list_comments(&self) -> StoreResult<Vec<Comment>> {
        let comments = self.comments.read().map_err(|_| lock_poisoned())?;
        let mut all: Vec<Comment> = comments.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn comments_by_issue(&self, issue_id: &str) -> StoreResult<Vec<Comment>> {
        let comments = self.comments.read().map_err(|_| lock_poisoned())?;
        let mut matching: Vec<Comment> = comments
            .values()
            .filter(|c| c.issue_id == issue_id)
            .cloned()
            .collect();
        // Newest first.
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(matching)
    }

    async fn update_comment(&self, id: &str, body: &str) -> StoreResult<Option<Comment>> {
        let mut comments = self.comments.write().map_err(|_| lock_poisoned())?;
        let Some(comment) = comments.get_mut(id) else {
            return Ok(None);
        };
        comment.body = body.to_string();
        Ok(Some(comment.clone()))
    }

    async fn delete_comment(&self, id: &str) -> StoreResult<bool> {
        let mut comments = self.comments.write().map_err(|_| lock_poisoned())?;
        Ok(comments.remove(id).is_some())
    }
}

fn sorted(mut issues: Vec<Issue>) -> Vec<Issue> {
    issues.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    issues
}

fn paginate(items: Vec<Issue>, page: u32, limit: u32) -> Vec<Issue> {
    let page = page.max(1) as usize;
    let skip = (page - 1).saturating_mul(limit as usize);
    items.into_iter().skip(skip).take(limit as usize).collect()
}
