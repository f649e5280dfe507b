//! User accounts and roles.

use serde::{Deserialize, Serialize};

/// Account role. Stored on the user record and consulted on every
/// permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access to everything.
    Admin,
    /// Regular account: owns and is assigned work.
    User,
    /// Read-only observer.
    Stakeholder,
}

impl Role {
    /// Returns the role name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
            Role::Stakeholder => "stakeholder",
        }
    }

    /// Parses a role from its stored name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "user" => Some(Role::User),
            "stakeholder" => Some(Role::Stakeholder),
            _ => None,
        }
    }
}

impl Default for Role {
    /// New accounts start as regular users.
    fn default() -> Self {
        Role::User
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Full user record, including credential material. Never serialized to
/// clients; see [`SafeUser`].
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    /// SHA-256 digest of the single live refresh token, if any.
    pub refresh_token_hash: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    /// Client-facing view of this user.
    pub fn safe(&self) -> SafeUser {
        SafeUser {
            id: self.id.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// User shape exposed over the API: no password hash, no token digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeUser {
    pub id: String,
    pub email: String,
    pub role: Role,
}

impl From<User> for SafeUser {
    fn from(user: User) -> Self {
        user.safe()
    }
}
