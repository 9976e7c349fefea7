use chrono::Utc;
use feedback_core::config::AppConfig;
use feedback_core::indexer::{FeedbackIndex, MemoryIndex};
use feedback_core::models::{Category, IndexRecord, Severity};
use feedback_core::pipeline;
use providers::github::{CommentUser, PullComment, PullRequest, ReviewSource};
use providers::ProviderError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Review source backed by fixtures; a repository that was never added
/// fails its listing, like an unreachable API would.
struct StubSource {
    repos: HashMap<String, Vec<(PullRequest, Vec<PullComment>)>>,
}

impl StubSource {
    fn new() -> Self {
        Self {
            repos: HashMap::new(),
        }
    }

    fn with_pr(mut self, repo: &str, number: u64, title: &str, comments: &[(u64, &str)]) -> Self {
        let pr = PullRequest {
            number,
            title: title.to_string(),
        };
        let comments = comments.iter().map(|(id, body)| comment(*id, body)).collect();
        self.repos
            .entry(repo.to_string())
            .or_default()
            .push((pr, comments));
        self
    }
}

fn comment(id: u64, body: &str) -> PullComment {
    PullComment {
        id,
        body: body.to_string(),
        path: "src/main.rs".to_string(),
        diff_hunk: "@@ -1 +1 @@".to_string(),
        user: CommentUser {
            login: "reviewer".to_string(),
        },
        created_at: Utc::now(),
        html_url: format!("https://example.com/c/{}", id),
    }
}

#[async_trait::async_trait]
impl ReviewSource for StubSource {
    async fn pull_requests(
        &self,
        repo: &str,
        _page_size: u32,
    ) -> Result<Vec<PullRequest>, ProviderError> {
        match self.repos.get(repo) {
            Some(prs) => Ok(prs.iter().map(|(pr, _)| pr.clone()).collect()),
            None => Err(ProviderError::RequestFailed(format!(
                "unknown repo {}",
                repo
            ))),
        }
    }

    async fn review_comments(
        &self,
        repo: &str,
        number: u64,
    ) -> Result<Vec<PullComment>, ProviderError> {
        let prs = self
            .repos
            .get(repo)
            .ok_or_else(|| ProviderError::RequestFailed("unknown repo".to_string()))?;
        Ok(prs
            .iter()
            .filter(|(pr, _)| pr.number == number)
            .flat_map(|(_, cs)| cs.clone())
            .collect())
    }
}

/// Index wrapper that records how often upsert is hit.
struct CountingIndex {
    inner: MemoryIndex,
    upsert_calls: AtomicUsize,
}

#[async_trait::async_trait]
impl FeedbackIndex for CountingIndex {
    async fn ensure_collection(&self, dim: usize) -> anyhow::Result<()> {
        self.inner.ensure_collection(dim).await
    }

    async fn upsert(&self, records: Vec<IndexRecord>) -> anyhow::Result<()> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.upsert(records).await
    }
}

fn test_config(repos: &[&str]) -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.repos = repos.iter().map(|r| r.to_string()).collect();
    cfg.embedding.dimension = 16;
    cfg
}

#[tokio::test]
async fn pipeline_indexes_and_classifies_comments() {
    let cfg = test_config(&["acme/api"]);
    let source = StubSource::new().with_pr(
        "acme/api",
        12,
        "Tighten query handling",
        &[
            (501, "SQL injection risk here"),
            (502, "please add a unit test"),
        ],
    );
    let registry = pipeline::build_registry(&cfg);
    let index = MemoryIndex::new();

    let summary = pipeline::run_with(&cfg, &source, &registry, &index)
        .await
        .unwrap();

    assert_eq!(summary.total_indexed, 2);
    assert_eq!(summary.repos_processed, 1);
    assert_eq!(summary.repos_failed, 0);
    assert_eq!(index.len(), 2);

    let security = index.get(501).unwrap();
    assert_eq!(security.vector.len(), 16);
    assert_eq!(security.payload.category, Category::Security);
    assert_eq!(security.payload.severity, Severity::High);
    assert_eq!(security.payload.repo, "acme/api");
    assert_eq!(security.payload.pr_title, "Tighten query handling");

    let testing = index.get(502).unwrap();
    assert_eq!(testing.payload.category, Category::Testing);
    assert_eq!(testing.payload.severity, Severity::Medium);
    // Both records of one batch share an indexed_at stamp.
    assert_eq!(security.payload.indexed_at, testing.payload.indexed_at);
}

#[tokio::test]
async fn failing_repo_does_not_stop_the_run() {
    let cfg = test_config(&["acme/api", "acme/missing", "acme/web"]);
    let source = StubSource::new()
        .with_pr("acme/api", 1, "One", &[(11, "nice")])
        .with_pr("acme/web", 2, "Two", &[(21, "this loop is slow")]);
    let registry = pipeline::build_registry(&cfg);
    let index = MemoryIndex::new();

    let summary = pipeline::run_with(&cfg, &source, &registry, &index)
        .await
        .unwrap();

    assert_eq!(summary.repos_processed, 2);
    assert_eq!(summary.repos_failed, 1);
    assert_eq!(summary.total_indexed, 2);
    assert!(index.get(11).is_some());
    assert!(index.get(21).is_some());
}

#[tokio::test]
async fn repo_without_comments_skips_the_index() {
    let cfg = test_config(&["acme/quiet"]);
    let source = StubSource::new().with_pr("acme/quiet", 5, "Quiet release", &[]);
    let registry = pipeline::build_registry(&cfg);
    let index = CountingIndex {
        inner: MemoryIndex::new(),
        upsert_calls: AtomicUsize::new(0),
    };

    let summary = pipeline::run_with(&cfg, &source, &registry, &index)
        .await
        .unwrap();

    assert_eq!(summary.repos_processed, 1);
    assert_eq!(summary.total_indexed, 0);
    assert_eq!(index.upsert_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn rerun_overwrites_instead_of_duplicating() {
    let cfg = test_config(&["acme/api"]);
    let source = StubSource::new().with_pr(
        "acme/api",
        3,
        "Refactor",
        &[(31, "rename this variable"), (32, "add docs")],
    );
    let registry = pipeline::build_registry(&cfg);
    let index = MemoryIndex::new();

    pipeline::run_with(&cfg, &source, &registry, &index)
        .await
        .unwrap();
    let second = pipeline::run_with(&cfg, &source, &registry, &index)
        .await
        .unwrap();

    assert_eq!(second.total_indexed, 2);
    // Same comment ids land on the same points, so nothing doubles up.
    assert_eq!(index.len(), 2);
}
