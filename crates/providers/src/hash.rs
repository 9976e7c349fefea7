use crate::{EmbedResponse, EmbeddingProvider, ProviderError};

/// Digest-derived embedding: blake3 of the input text, extended to the
/// configured dimension, each byte normalized into `[0.0, 1.0]`.
///
/// Deterministic and fully local, so re-embedding identical text always
/// yields the same vector and reindexing is safe to rerun. Stands in for a
/// real embedding service until one is wired up behind the same trait.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut hasher = blake3::Hasher::new();
        hasher.update(text.as_bytes());
        // The extendable output fills any dimension, not just one digest block.
        let mut bytes = vec![0u8; self.dim];
        hasher.finalize_xof().fill(&mut bytes);
        bytes.into_iter().map(|b| f32::from(b) / 255.0).collect()
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<EmbedResponse, ProviderError> {
        Ok(EmbedResponse {
            vectors: texts.iter().map(|t| self.vector_for(t)).collect(),
        })
    }
}
