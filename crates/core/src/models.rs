use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single review comment as observed on the source, immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewComment {
    pub id: u64,
    pub repo: String,
    pub pr_number: u64,
    pub pr_title: String,
    pub body: String,
    pub path: String,
    pub diff_hunk: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub url: String,
}

impl ReviewComment {
    /// Text submitted to the embedder: the comment body plus the code
    /// context it was left on.
    pub fn embedding_text(&self) -> String {
        format!("{}\n\nCode context:\n{}", self.body, self.diff_hunk)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    CodeQuality,
    Security,
    Performance,
    Testing,
    Documentation,
    Style,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub category: Category,
    pub severity: Severity,
}

/// Metadata stored alongside the vector; the shape downstream consumers read
/// back out of the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackPayload {
    pub repo: String,
    pub pr_number: u64,
    pub pr_title: String,
    pub body: String,
    pub path: String,
    pub diff_hunk: String,
    #[serde(rename = "user")]
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub url: String,
    pub category: Category,
    pub severity: Severity,
    pub indexed_at: DateTime<Utc>,
}

impl FeedbackPayload {
    pub fn new(
        comment: ReviewComment,
        classification: Classification,
        indexed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            repo: comment.repo,
            pr_number: comment.pr_number,
            pr_title: comment.pr_title,
            body: comment.body,
            path: comment.path,
            diff_hunk: comment.diff_hunk,
            author: comment.author,
            created_at: comment.created_at,
            url: comment.url,
            category: classification.category,
            severity: classification.severity,
            indexed_at,
        }
    }
}

/// Unit persisted to the vector index; `id` is the comment id, so rerunning
/// the pipeline overwrites rather than duplicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexRecord {
    pub id: u64,
    pub vector: Vec<f32>,
    pub payload: FeedbackPayload,
}
