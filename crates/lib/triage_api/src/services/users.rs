//! User management behind permission checks.
//!
//! Responses only ever carry [`SafeUser`]; password hashes and refresh-token
//! digests stay server side.

use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::{CreateUserRequest, UpdateUserRequest};
use crate::services::auth::{validate_email, validate_password};
use crate::services::is_valid_id;
use triage_core::authz::{AccessContext, Action, Resource, can_perform};
use triage_core::auth::password;
use triage_core::models::{Role, SafeUser, User};
use triage_core::store::{Store, UserPatch};

pub async fn list_users(store: &dyn Store, actor: &User) -> AppResult<Vec<SafeUser>> {
    ensure_can_read(actor)?;
    let users = store.list_users().await?;
    Ok(users.into_iter().map(SafeUser::from).collect())
}

pub async fn get_user(store: &dyn Store, actor: &User, user_id: &str) -> AppResult<SafeUser> {
    ensure_can_read(actor)?;
    Ok(load_user(store, user_id).await?.safe())
}

/// Create an account with an explicit role. The policy table grants user
/// writes to admins only.
pub async fn create_user(
    store: &dyn Store,
    actor: &User,
    req: CreateUserRequest,
) -> AppResult<SafeUser> {
    let ctx = AccessContext::new(&actor.id).creation();
    if !can_perform(actor.role, Resource::Users, Action::Write, &ctx) {
        return Err(AppError::PermissionDenied);
    }
    validate_email(&req.email)?;
    validate_password(&req.password)?;
    if store.user_by_email(&req.email).await?.is_some() {
        return Err(AppError::EmailTaken);
    }

    let password_hash = password::hash_password(&req.password)?;
    let role = req.role.unwrap_or_default();
    let user = store.create_user(&req.email, &password_hash, role).await?;
    info!(user_id = %user.id, role = %role, "user created");
    Ok(user.safe())
}

/// Admins may update anyone; everyone else only themself, and never their
/// own role.
pub async fn update_user(
    store: &dyn Store,
    actor: &User,
    user_id: &str,
    req: UpdateUserRequest,
) -> AppResult<SafeUser> {
    if actor.role != Role::Admin && actor.id != user_id {
        return Err(AppError::PermissionDenied);
    }
    if req.role.is_some() && actor.role != Role::Admin {
        return Err(AppError::PermissionDenied);
    }
    load_user(store, user_id).await?;

    if let Some(email) = &req.email {
        validate_email(email)?;
    }
    let password_hash = match &req.password {
        Some(new_password) => {
            validate_password(new_password)?;
            Some(password::hash_password(new_password)?)
        }
        None => None,
    };

    let patch = UserPatch {
        email: req.email,
        password_hash,
        role: req.role,
    };
    let updated = store
        .update_user(user_id, patch)
        .await?
        .ok_or_else(user_not_found)?;
    Ok(updated.safe())
}

/// Deleting accounts is admin-only. The deleted account is returned.
pub async fn delete_user(store: &dyn Store, actor: &User, user_id: &str) -> AppResult<SafeUser> {
    let ctx = AccessContext::new(&actor.id);
    if !can_perform(actor.role, Resource::Users, Action::Delete, &ctx) {
        return Err(AppError::PermissionDenied);
    }
    let user = load_user(store, user_id).await?;
    store.delete_user(user_id).await?;
    info!(user_id = %user_id, actor_id = %actor.id, "user deleted");
    Ok(user.safe())
}

async fn load_user(store: &dyn Store, user_id: &str) -> AppResult<User> {
    if !is_valid_id(user_id) {
        return Err(user_not_found());
    }
    store.user_by_id(user_id).await?.ok_or_else(user_not_found)
}

fn user_not_found() -> AppError {
    AppError::NotFound("User doesn't exist".to_string())
}

fn ensure_can_read(actor: &User) -> AppResult<()> {
    let ctx = AccessContext::new(&actor.id);
    if !can_perform(actor.role, Resource::Users, Action::Read, &ctx) {
        return Err(AppError::PermissionDenied);
    }
    Ok(())
}
