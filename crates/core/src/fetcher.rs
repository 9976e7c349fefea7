//! Harvests review comments for one repository from a `ReviewSource`.

use anyhow::Context;
use providers::github::{PullComment, ReviewSource};
use tracing::{debug, warn};

use crate::models::ReviewComment;

/// Collects every review comment on the repository's recent pull requests.
///
/// A failed pull-request listing fails the whole repository. A failed
/// comment fetch on a single PR is logged and skipped, so one broken PR
/// does not lose the rest.
pub async fn fetch(
    source: &dyn ReviewSource,
    repo: &str,
    lookback_days: u32,
    page_size: u32,
) -> anyhow::Result<Vec<ReviewComment>> {
    debug!(
        "Listing PRs for {} (page size {}, lookback {} days)",
        repo, page_size, lookback_days
    );
    let pulls = source
        .pull_requests(repo, page_size)
        .await
        .with_context(|| format!("Failed to list pull requests for {}", repo))?;

    let mut comments = Vec::new();
    for pr in &pulls {
        let fetched = match source.review_comments(repo, pr.number).await {
            Ok(c) => c,
            Err(e) => {
                warn!("Failed to fetch comments for PR #{}: {}", pr.number, e);
                continue;
            }
        };
        for raw in fetched {
            comments.push(to_review_comment(raw, repo, pr.number, &pr.title));
        }
    }
    Ok(comments)
}

fn to_review_comment(raw: PullComment, repo: &str, pr_number: u64, pr_title: &str) -> ReviewComment {
    ReviewComment {
        id: raw.id,
        repo: repo.to_string(),
        pr_number,
        pr_title: pr_title.to_string(),
        body: raw.body,
        path: raw.path,
        diff_hunk: raw.diff_hunk,
        author: raw.user.login,
        created_at: raw.created_at,
        url: raw.html_url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use providers::github::{CommentUser, PullRequest};
    use providers::ProviderError;

    struct StubSource {
        pulls: Result<Vec<PullRequest>, String>,
        // PR numbers whose comment fetch should fail.
        broken: Vec<u64>,
    }

    #[async_trait::async_trait]
    impl ReviewSource for StubSource {
        async fn pull_requests(
            &self,
            _repo: &str,
            _page_size: u32,
        ) -> Result<Vec<PullRequest>, ProviderError> {
            self.pulls
                .clone()
                .map_err(ProviderError::RequestFailed)
        }

        async fn review_comments(
            &self,
            _repo: &str,
            number: u64,
        ) -> Result<Vec<PullComment>, ProviderError> {
            if self.broken.contains(&number) {
                return Err(ProviderError::RequestFailed("boom".to_string()));
            }
            Ok(vec![PullComment {
                id: number * 100,
                body: format!("comment on #{}", number),
                path: "src/lib.rs".to_string(),
                diff_hunk: "@@ hunk @@".to_string(),
                user: CommentUser {
                    login: "reviewer".to_string(),
                },
                created_at: Utc::now(),
                html_url: format!("https://example.com/{}", number),
            }])
        }
    }

    fn pr(number: u64, title: &str) -> PullRequest {
        PullRequest {
            number,
            title: title.to_string(),
        }
    }

    #[tokio::test]
    async fn broken_pr_is_skipped_not_fatal() {
        let source = StubSource {
            pulls: Ok(vec![pr(1, "first"), pr(7, "broken"), pr(9, "last")]),
            broken: vec![7],
        };
        let comments = fetch(&source, "acme/api", 30, 50).await.unwrap();
        let numbers: Vec<u64> = comments.iter().map(|c| c.pr_number).collect();
        assert_eq!(numbers, vec![1, 9]);
    }

    #[tokio::test]
    async fn listing_failure_fails_the_repo() {
        let source = StubSource {
            pulls: Err("api down".to_string()),
            broken: vec![],
        };
        let err = fetch(&source, "acme/api", 30, 50).await.unwrap_err();
        assert!(err.to_string().contains("acme/api"));
    }

    #[tokio::test]
    async fn comment_fields_carry_pr_context() {
        let source = StubSource {
            pulls: Ok(vec![pr(3, "Add caching")]),
            broken: vec![],
        };
        let comments = fetch(&source, "acme/api", 30, 50).await.unwrap();
        assert_eq!(comments.len(), 1);
        let c = &comments[0];
        assert_eq!(c.id, 300);
        assert_eq!(c.repo, "acme/api");
        assert_eq!(c.pr_number, 3);
        assert_eq!(c.pr_title, "Add caching");
        assert_eq!(c.author, "reviewer");
        assert_eq!(c.url, "https://example.com/3");
    }
}
