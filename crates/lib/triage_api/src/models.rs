//! Request and response bodies for the HTTP API.

use serde::{Deserialize, Serialize};

use triage_core::models::{IssueKind, IssueStatus, Priority, Role, SafeUser};

/// Envelope for every successful response: the payload plus a short
/// operation tag clients key on.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Payload for signup and login: the account plus a fresh access token. The
/// refresh token travels only in the `refreshToken` cookie.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthData {
    pub user: SafeUser,
    pub access_token: String,
}

/// Payload for a token refresh.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenData {
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIssueRequest {
    pub title: String,
    pub description: String,
    pub priority: Option<Priority>,
    #[serde(rename = "type")]
    pub kind: Option<IssueKind>,
    pub status: Option<IssueStatus>,
    pub image: Option<String>,
    pub assignee_id: Option<String>,
}

/// Partial issue update; absent fields stay unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIssueRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    #[serde(rename = "type")]
    pub kind: Option<IssueKind>,
    pub status: Option<IssueStatus>,
    pub image: Option<String>,
    pub assignee_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    /// Comment text, under its historical wire name.
    pub comment: String,
    pub issue_id: String,
}

/// Partial comment update; the author and issue are immutable.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCommentRequest {
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
}

/// Partial user update; absent fields stay unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

/// Query string for paginated listings.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageQuery {
    /// Requested page, counted from 1.
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Page size; zero and absent both mean the default of 10.
    pub fn limit(&self) -> u32 {
        match self.limit {
            Some(0) | None => 10,
            Some(n) => n,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_query_defaults() {
        let query = PageQuery {
            page: None,
            limit: None,
        };
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), 10);

        let query = PageQuery {
            page: Some(0),
            limit: Some(0),
        };
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), 10);
    }

    #[test]
    fn issue_request_accepts_type_field() {
        let body = r#"{"title":"Broken build","description":"CI is red","type":"bug"}"#;
        let req: CreateIssueRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.kind, Some(IssueKind::Bug));
        assert!(req.assignee_id.is_none());
    }
}
