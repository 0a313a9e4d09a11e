use async_trait::async_trait;

use crate::types::{ChunkMetadata, QueryHit, StoredChunk};

/// Maps text to a fixed-dimension vector. Implementations must return
/// L2-normalized vectors of length `dim()`.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;

    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// A named, persistent collection of chunks searchable by embedding distance.
///
/// The store owns the embedder: `add` and `query` embed their text inputs.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    fn name(&self) -> &str;

    /// Write chunks keyed by `ids`. Existing rows with the same id are replaced.
    async fn add(
        &self,
        ids: &[String],
        documents: &[String],
        metadatas: &[ChunkMetadata],
    ) -> anyhow::Result<usize>;

    /// Nearest `n_results` rows to `text`, closest first.
    async fn query(&self, text: &str, n_results: usize) -> anyhow::Result<Vec<QueryHit>>;

    /// Rows in storage order, at most `limit` when given.
    async fn get(&self, limit: Option<usize>) -> anyhow::Result<Vec<StoredChunk>>;

    async fn count(&self) -> anyhow::Result<usize>;
}

/// A hosted or local model that turns a prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn model(&self) -> &str;
    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}
