//! Role-based permission evaluation.
//!
//! [`can_perform`] is a pure decision function: it reads the const policy
//! table in [`policy`] and a caller-assembled [`AccessContext`], and returns
//! a bare allow/deny. It never touches storage and never errors.

pub mod policy;

pub use policy::{Action, Resource, Scope};

use crate::models::Role;

/// Facts about the acting user's relation to the target resource, assembled
/// by the caller from the loaded resource. Never persisted.
#[derive(Debug, Clone)]
pub struct AccessContext {
    /// Id of the user performing the action.
    pub actor_id: String,
    /// Id of the resource's owner (author), when a target exists.
    pub owner_id: Option<String>,
    /// Id of the resource's assignee, when it has one.
    pub assignee_id: Option<String>,
    /// True when the action would create the resource rather than touch an
    /// existing one.
    pub is_creation: bool,
}

impl AccessContext {
    /// Context with no target-resource facts (reads, listings).
    pub fn new(actor_id: impl Into<String>) -> Self {
        Self {
            actor_id: actor_id.into(),
            owner_id: None,
            assignee_id: None,
            is_creation: false,
        }
    }

    /// Records the target's owner.
    pub fn owned_by(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    /// Records the target's assignee, if any.
    pub fn assigned_to<S: Into<String>>(mut self, assignee_id: Option<S>) -> Self {
        self.assignee_id = assignee_id.map(Into::into);
        self
    }

    /// Marks the action as a creation.
    pub fn creation(mut self) -> Self {
        self.is_creation = true;
        self
    }
}

/// Decides whether `role` may perform `action` on `resource` in the given
/// context.
///
/// Admin allows unconditionally, before any table lookup. Otherwise the
/// role's rules are filtered to those matching the resource and granting the
/// action, and the action is allowed if any surviving rule's scope holds.
pub fn can_perform(role: Role, resource: Resource, action: Action, ctx: &AccessContext) -> bool {
    if role == Role::Admin {
        return true;
    }
    policy::rules_for(role)
        .iter()
        .filter(|rule| rule.resource == resource && rule.actions.contains(&action))
        .any(|rule| scope_allows(rule.scope, action, ctx))
}

fn scope_allows(scope: Scope, action: Action, ctx: &AccessContext) -> bool {
    match scope {
        Scope::All => true,
        Scope::Own => {
            // Creating something makes you its owner.
            if action == Action::Write && ctx.is_creation {
                return true;
            }
            ctx.owner_id.as_deref() == Some(ctx.actor_id.as_str())
        }
        Scope::Assigned => ctx.assignee_id.as_deref() == Some(ctx.actor_id.as_str()),
        Scope::ReadOnly => action == Action::Read,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACTOR: &str = "11111111-1111-1111-1111-111111111111";
    const OTHER: &str = "22222222-2222-2222-2222-222222222222";

    fn ctx() -> AccessContext {
        AccessContext::new(ACTOR)
    }

    #[test]
    fn admin_allows_everything() {
        for resource in [Resource::Issues, Resource::Users, Resource::Comments] {
            for action in [Action::Read, Action::Write, Action::Delete] {
                assert!(can_perform(Role::Admin, resource, action, &ctx()));
                // Even against a resource owned by someone else.
                assert!(can_perform(
                    Role::Admin,
                    resource,
                    action,
                    &ctx().owned_by(OTHER)
                ));
            }
        }
    }

    #[test]
    fn user_can_create_issues() {
        assert!(can_perform(
            Role::User,
            Resource::Issues,
            Action::Write,
            &ctx().creation()
        ));
    }

    #[test]
    fn user_can_create_comments() {
        assert!(can_perform(
            Role::User,
            Resource::Comments,
            Action::Write,
            &ctx().creation()
        ));
    }

    #[test]
    fn user_cannot_delete_someone_elses_issue() {
        assert!(!can_perform(
            Role::User,
            Resource::Issues,
            Action::Delete,
            &ctx().owned_by(OTHER)
        ));
    }

    #[test]
    fn user_can_delete_own_issue() {
        assert!(can_perform(
            Role::User,
            Resource::Issues,
            Action::Delete,
            &ctx().owned_by(ACTOR)
        ));
    }

    #[test]
    fn assignee_can_write_but_not_delete() {
        let assigned = ctx().owned_by(OTHER).assigned_to(Some(ACTOR));
        assert!(can_perform(
            Role::User,
            Resource::Issues,
            Action::Write,
            &assigned
        ));
        assert!(!can_perform(
            Role::User,
            Resource::Issues,
            Action::Delete,
            &assigned
        ));
    }

    #[test]
    fn user_can_read_unrelated_issues() {
        // Neither owner nor assignee: the read-only rule still grants reads.
        let unrelated = ctx().owned_by(OTHER).assigned_to(Some(OTHER));
        assert!(can_perform(
            Role::User,
            Resource::Issues,
            Action::Read,
            &unrelated
        ));
        assert!(!can_perform(
            Role::User,
            Resource::Issues,
            Action::Write,
            &unrelated
        ));
    }

    #[test]
    fn user_has_no_write_grant_on_users() {
        assert!(can_perform(Role::User, Resource::Users, Action::Read, &ctx()));
        assert!(!can_perform(
            Role::User,
            Resource::Users,
            Action::Write,
            &ctx().creation()
        ));
        assert!(!can_perform(
            Role::User,
            Resource::Users,
            Action::Delete,
            &ctx()
        ));
    }

    #[test]
    fn stakeholder_is_read_only_everywhere() {
        for resource in [Resource::Issues, Resource::Users, Resource::Comments] {
            assert!(can_perform(Role::Stakeholder, resource, Action::Read, &ctx()));
            // Ownership and creation do not help: there is no write grant.
            assert!(!can_perform(
                Role::Stakeholder,
                resource,
                Action::Write,
                &ctx().creation()
            ));
            assert!(!can_perform(
                Role::Stakeholder,
                resource,
                Action::Delete,
                &ctx().owned_by(ACTOR)
            ));
        }
    }

    #[test]
    fn creation_clause_applies_to_writes_only() {
        // A delete with is_creation set still requires ownership.
        assert!(!can_perform(
            Role::User,
            Resource::Issues,
            Action::Delete,
            &ctx().creation()
        ));
    }
}
