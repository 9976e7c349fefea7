use crate::{ProviderError, REQUEST_TIMEOUT};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::Client;
use serde::Deserialize;

// GitHub rejects requests without a User-Agent.
const AGENT: &str = "feedback-indexer";
const API_ACCEPT: &str = "application/vnd.github.v3+json";

#[derive(Clone)]
pub struct GithubConfig {
    pub api_url: String,
    pub token: Option<String>,
}

#[derive(Clone)]
pub struct GithubClient {
    client: Client,
    cfg: GithubConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullComment {
    pub id: u64,
    pub body: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub diff_hunk: String,
    pub user: CommentUser,
    pub created_at: DateTime<Utc>,
    pub html_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentUser {
    pub login: String,
}

/// Read side of the review-comment source: list recent pull requests, then
/// list the review comments left on one of them.
#[async_trait::async_trait]
pub trait ReviewSource: Send + Sync {
    async fn pull_requests(
        &self,
        repo: &str,
        page_size: u32,
    ) -> Result<Vec<PullRequest>, ProviderError>;

    async fn review_comments(
        &self,
        repo: &str,
        number: u64,
    ) -> Result<Vec<PullComment>, ProviderError>;
}

impl GithubClient {
    pub fn new(cfg: GithubConfig) -> Self {
        Self {
            client: Client::new(),
            cfg,
        }
    }

    fn get(&self, url: String) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .get(url)
            .timeout(REQUEST_TIMEOUT)
            .header(USER_AGENT, AGENT)
            .header(ACCEPT, API_ACCEPT);
        // Without a token the request goes out unauthenticated and the server
        // decides; token presence is not validated here.
        if let Some(token) = &self.cfg.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }
}

#[async_trait::async_trait]
impl ReviewSource for GithubClient {
    async fn pull_requests(
        &self,
        repo: &str,
        page_size: u32,
    ) -> Result<Vec<PullRequest>, ProviderError> {
        let url = format!(
            "{}/repos/{}/pulls?state=all&per_page={}&sort=updated&direction=desc",
            self.cfg.api_url, repo, page_size
        );
        let resp = self
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.bytes().await.unwrap_or(Bytes::from_static(b""));
            return Err(ProviderError::RequestFailed(format!(
                "status {} body {:?}",
                status, body
            )));
        }
        resp.json()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))
    }

    async fn review_comments(
        &self,
        repo: &str,
        number: u64,
    ) -> Result<Vec<PullComment>, ProviderError> {
        let url = format!("{}/repos/{}/pulls/{}/comments", self.cfg.api_url, repo, number);
        let resp = self
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.bytes().await.unwrap_or(Bytes::from_static(b""));
            return Err(ProviderError::RequestFailed(format!(
                "status {} body {:?}",
                status, body
            )));
        }
        resp.json()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))
    }
}
