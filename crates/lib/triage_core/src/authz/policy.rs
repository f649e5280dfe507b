//! The role-permission policy table.
//!
//! Rules are const data, fixed at compile time. Changing what a role may do
//! is an edit here, never a runtime mutation.

use serde::{Deserialize, Serialize};

use crate::models::Role;

/// Resource classes that permissions are granted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Issues,
    Users,
    Comments,
}

/// Actions a rule can grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Read,
    Write,
    Delete,
}

/// How a rule's grant is scoped relative to the acting user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Unconditional.
    All,
    /// The acting user owns the resource (or is creating one).
    Own,
    /// The acting user is the resource's assignee.
    Assigned,
    /// Reads only, regardless of ownership.
    ReadOnly,
}

/// One row of the policy table: a resource, the actions granted on it, and
/// the scope those grants carry.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub resource: Resource,
    pub actions: &'static [Action],
    pub scope: Scope,
}

const ALL_ACTIONS: &[Action] = &[Action::Read, Action::Write, Action::Delete];
const READ_WRITE: &[Action] = &[Action::Read, Action::Write];
const READ: &[Action] = &[Action::Read];

/// Admins also short-circuit past the table entirely; these rows only state
/// the grant explicitly.
const ADMIN_RULES: &[Rule] = &[
    Rule {
        resource: Resource::Issues,
        actions: ALL_ACTIONS,
        scope: Scope::All,
    },
    Rule {
        resource: Resource::Users,
        actions: ALL_ACTIONS,
        scope: Scope::All,
    },
    Rule {
        resource: Resource::Comments,
        actions: ALL_ACTIONS,
        scope: Scope::All,
    },
];

const USER_RULES: &[Rule] = &[
    Rule {
        resource: Resource::Issues,
        actions: ALL_ACTIONS,
        scope: Scope::Own,
    },
    Rule {
        resource: Resource::Issues,
        actions: READ_WRITE,
        scope: Scope::Assigned,
    },
    Rule {
        resource: Resource::Issues,
        actions: READ,
        scope: Scope::ReadOnly,
    },
    Rule {
        resource: Resource::Users,
        actions: READ,
        scope: Scope::ReadOnly,
    },
    Rule {
        resource: Resource::Comments,
        actions: ALL_ACTIONS,
        scope: Scope::Own,
    },
];

const STAKEHOLDER_RULES: &[Rule] = &[
    Rule {
        resource: Resource::Issues,
        actions: READ,
        scope: Scope::ReadOnly,
    },
    Rule {
        resource: Resource::Users,
        actions: READ,
        scope: Scope::ReadOnly,
    },
    Rule {
        resource: Resource::Comments,
        actions: READ,
        scope: Scope::ReadOnly,
    },
];

/// Returns the rule set for a role.
pub fn rules_for(role: Role) -> &'static [Rule] {
    match role {
        Role::Admin => ADMIN_RULES,
        Role::User => USER_RULES,
        Role::Stakeholder => STAKEHOLDER_RULES,
    }
}
