//! Comments attached to issues.

use serde::{Deserialize, Serialize};

/// A comment on an issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    /// Comment text. The wire field keeps its historical name `comment`.
    #[serde(rename = "comment")]
    pub body: String,
    pub author_id: String,
    pub issue_id: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
