//! Few-shot retrieval: find indexed feedback similar to a query.

use anyhow::Context;
use providers::qdrant::QdrantClient;
use providers::ProviderRegistry;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SearchHit {
    pub id: serde_json::Value,
    pub score: f32,
    pub payload: Option<serde_json::Value>,
}

/// Embeds the query with the preferred provider and searches the collection.
/// `category` and `repo` narrow the results via payload filters.
pub async fn similar(
    client: &QdrantClient,
    registry: &ProviderRegistry,
    query: &str,
    limit: u64,
    category: Option<&str>,
    repo: Option<&str>,
) -> anyhow::Result<Vec<SearchHit>> {
    let embedder = registry
        .embedding(None)
        .context("resolving embedding provider")?;
    let response = embedder.embed(&[query.to_string()]).await?;
    let vector = response
        .vectors
        .into_iter()
        .next()
        .context("embedder returned no vector for the query")?;

    let filter = build_filter(category, repo);
    let resp = client.search(vector, limit, filter).await?;
    Ok(resp
        .result
        .into_iter()
        .map(|r| SearchHit {
            id: r.id,
            score: r.score,
            payload: r.payload,
        })
        .collect())
}

fn build_filter(category: Option<&str>, repo: Option<&str>) -> Option<serde_json::Value> {
    let mut must = Vec::new();
    if let Some(c) = category {
        must.push(serde_json::json!({ "key": "category", "match": { "value": c } }));
    }
    if let Some(r) = repo {
        must.push(serde_json::json!({ "key": "repo", "match": { "value": r } }));
    }
    if must.is_empty() {
        None
    } else {
        Some(serde_json::json!({ "must": must }))
    }
}
