//! Orchestrates the harvest, classify, embed, upsert flow across repositories.

use crate::config::AppConfig;
use crate::indexer::{FeedbackIndex, QdrantIndex};
use crate::models::{FeedbackPayload, IndexRecord};
use crate::{classifier, fetcher};
use anyhow::{ensure, Context};
use chrono::Utc;
use providers::github::{GithubClient, GithubConfig, ReviewSource};
use providers::hash::HashEmbedder;
use providers::openai::{OpenAiConfig, OpenAiEmbedder};
use providers::qdrant::{QdrantClient, QdrantConfig};
use providers::ProviderRegistry;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Default)]
pub struct PipelineSummary {
    pub total_indexed: usize,
    pub repos_processed: usize,
    pub repos_failed: usize,
}

/// Runs the full pipeline against the configured GitHub API and Qdrant
/// instance.
pub async fn run(config: AppConfig) -> anyhow::Result<PipelineSummary> {
    let registry = build_registry(&config);
    let source = build_source(&config);
    let index = build_index(&config);
    run_with(&config, &source, &registry, &index).await
}

/// Pipeline core over abstract source and index. Repositories are processed
/// sequentially in configured order; one failing repository is logged and
/// counted, the rest still run.
pub async fn run_with(
    cfg: &AppConfig,
    source: &dyn ReviewSource,
    registry: &ProviderRegistry,
    index: &dyn FeedbackIndex,
) -> anyhow::Result<PipelineSummary> {
    if let Err(e) = index.ensure_collection(cfg.embedding.dimension).await {
        // Each repository's upsert will fail on its own; keep going so the
        // summary still reports every repository.
        warn!("Failed to ensure collection: {}", e);
    }

    let mut summary = PipelineSummary::default();
    for repo in &cfg.repos {
        info!("Fetching comments from {}...", repo);
        match index_repo(cfg, source, registry, index, repo).await {
            Ok(count) => {
                info!("Indexed {} comments from {}", count, repo);
                summary.total_indexed += count;
                summary.repos_processed += 1;
            }
            Err(e) => {
                error!("Failed to index {}: {:#}", repo, e);
                summary.repos_failed += 1;
            }
        }
    }
    Ok(summary)
}

async fn index_repo(
    cfg: &AppConfig,
    source: &dyn ReviewSource,
    registry: &ProviderRegistry,
    index: &dyn FeedbackIndex,
    repo: &str,
) -> anyhow::Result<usize> {
    let comments = fetcher::fetch(source, repo, cfg.github.lookback_days, cfg.github.page_size)
        .await?;
    if comments.is_empty() {
        return Ok(0);
    }

    let embedder = registry
        .embedding(Some(cfg.embedding.provider.as_str()))
        .context("resolving embedding provider")?;
    let texts: Vec<String> = comments.iter().map(|c| c.embedding_text()).collect();
    let response = embedder.embed(&texts).await?;
    ensure!(
        response.vectors.len() == comments.len(),
        "embedder returned {} vectors for {} comments",
        response.vectors.len(),
        comments.len()
    );

    // One timestamp per batch, so every record of a run carries the same
    // indexed_at.
    let indexed_at = Utc::now();
    let mut records = Vec::with_capacity(comments.len());
    for (comment, vector) in comments.into_iter().zip(response.vectors) {
        ensure!(
            vector.len() == cfg.embedding.dimension,
            "embedding has {} dimensions, configured {}",
            vector.len(),
            cfg.embedding.dimension
        );
        let classification = classifier::classify(&comment.body);
        records.push(IndexRecord {
            id: comment.id,
            vector,
            payload: FeedbackPayload::new(comment, classification, indexed_at),
        });
    }

    let count = records.len();
    index.upsert(records).await?;
    Ok(count)
}

pub fn build_registry(cfg: &AppConfig) -> ProviderRegistry {
    let mut reg = ProviderRegistry::new()
        .with_embedding("hash", Arc::new(HashEmbedder::new(cfg.embedding.dimension)));

    // The remote strategy is only registered when a key is configured.
    if let Some(key) = &cfg.embedding.api_key {
        let provider = OpenAiEmbedder::new(OpenAiConfig {
            api_key: key.clone(),
            base_url: cfg.embedding.api_url.clone(),
            model: cfg.embedding.model.clone(),
        });
        reg = reg.with_embedding("openai", Arc::new(provider));
    }

    reg.set_preferred_embedding(&cfg.embedding.provider)
}

pub fn build_source(cfg: &AppConfig) -> GithubClient {
    GithubClient::new(GithubConfig {
        api_url: cfg.github.api_url.clone(),
        token: cfg.github.token.clone(),
    })
}

pub fn build_qdrant(cfg: &AppConfig) -> QdrantClient {
    QdrantClient::new(QdrantConfig {
        url: cfg.qdrant.url.clone(),
        collection: cfg.qdrant.collection.clone(),
        api_key: cfg.qdrant.api_key.clone(),
    })
}

pub fn build_index(cfg: &AppConfig) -> QdrantIndex {
    QdrantIndex::new(build_qdrant(cfg))
}
