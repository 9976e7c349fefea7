//! Destinations for classified, embedded feedback records.

use providers::qdrant::{QdrantClient, QdrantPoint};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::info;

use crate::models::IndexRecord;

#[async_trait::async_trait]
pub trait FeedbackIndex: Send + Sync {
    /// Creates the backing collection if it does not exist yet. Safe to
    /// call on every run.
    async fn ensure_collection(&self, dim: usize) -> anyhow::Result<()>;

    /// Writes records keyed by comment id; an existing id is overwritten.
    async fn upsert(&self, records: Vec<IndexRecord>) -> anyhow::Result<()>;
}

pub struct QdrantIndex {
    client: QdrantClient,
}

impl QdrantIndex {
    pub fn new(client: QdrantClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl FeedbackIndex for QdrantIndex {
    async fn ensure_collection(&self, dim: usize) -> anyhow::Result<()> {
        let existing = self.client.list_collections().await?;
        let name = self.client.collection();
        if !existing.iter().any(|c| c == name) {
            info!("Creating collection: {}", name);
            self.client.create_collection(name, dim as u64).await?;
        }
        Ok(())
    }

    async fn upsert(&self, records: Vec<IndexRecord>) -> anyhow::Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let mut points = Vec::with_capacity(records.len());
        for r in records {
            points.push(QdrantPoint {
                id: r.id,
                vector: r.vector,
                payload: serde_json::to_value(&r.payload)?,
            });
        }
        self.client.upsert(points).await?;
        Ok(())
    }
}

/// In-memory index used by dry runs and tests; nothing leaves the process.
#[derive(Default)]
pub struct MemoryIndex {
    records: RwLock<HashMap<u64, IndexRecord>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().unwrap().is_empty()
    }

    pub fn get(&self, id: u64) -> Option<IndexRecord> {
        self.records.read().unwrap().get(&id).cloned()
    }
}

#[async_trait::async_trait]
impl FeedbackIndex for MemoryIndex {
    async fn ensure_collection(&self, _dim: usize) -> anyhow::Result<()> {
        Ok(())
    }

    async fn upsert(&self, records: Vec<IndexRecord>) -> anyhow::Result<()> {
        let mut map = self.records.write().unwrap();
        for r in records {
            map.insert(r.id, r);
        }
        Ok(())
    }
}
