//! Issues: the tracked work items.

use serde::{Deserialize, Serialize};

/// Issue priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

/// What kind of work an issue describes. Serialized as `type` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    Question,
    Bug,
    Feature,
    Documentation,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::Question => "question",
            IssueKind::Bug => "bug",
            IssueKind::Feature => "feature",
            IssueKind::Documentation => "documentation",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "question" => Some(IssueKind::Question),
            "bug" => Some(IssueKind::Bug),
            "feature" => Some(IssueKind::Feature),
            "documentation" => Some(IssueKind::Documentation),
            _ => None,
        }
    }
}

/// Workflow status. Wire values keep their historical PascalCase spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueStatus {
    ToDo,
    InProgress,
    Done,
}

impl IssueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::ToDo => "ToDo",
            IssueStatus::InProgress => "InProgress",
            IssueStatus::Done => "Done",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ToDo" => Some(IssueStatus::ToDo),
            "InProgress" => Some(IssueStatus::InProgress),
            "Done" => Some(IssueStatus::Done),
            _ => None,
        }
    }
}

impl Default for IssueStatus {
    fn default() -> Self {
        IssueStatus::ToDo
    }
}

/// A tracked issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    pub title: String,
    pub description: String,
    pub priority: Option<Priority>,
    #[serde(rename = "type")]
    pub kind: Option<IssueKind>,
    pub status: IssueStatus,
    /// Optional attachment reference (a URL or storage key).
    pub image: Option<String>,
    pub author_id: String,
    pub assignee_id: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
