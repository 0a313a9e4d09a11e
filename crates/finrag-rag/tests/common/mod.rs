#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Mutex;

use finrag_core::traits::{ChunkStore, TextGenerator};
use finrag_core::types::{ChunkMetadata, QueryHit, StoredChunk};

pub fn hit(id: &str, content: &str, distance: f32) -> QueryHit {
    QueryHit {
        id: id.to_string(),
        content: content.to_string(),
        metadata: ChunkMetadata { source: format!("file://data/{id}.txt") },
        distance,
    }
}

/// Returns canned hits (already nearest first) and records what it was asked.
#[derive(Default)]
pub struct StubStore {
    pub hits: Vec<QueryHit>,
    pub queries: Mutex<Vec<(String, usize)>>,
    pub adds: Mutex<usize>,
}

impl StubStore {
    pub fn with_hits(hits: Vec<QueryHit>) -> Self {
        Self { hits, ..Self::default() }
    }
}

#[async_trait]
impl ChunkStore for StubStore {
    fn name(&self) -> &str {
        "stub"
    }

    async fn add(&self, ids: &[String], _documents: &[String], _metadatas: &[ChunkMetadata]) -> Result<usize> {
        *self.adds.lock().unwrap() += 1;
        Ok(ids.len())
    }

    async fn query(&self, text: &str, n_results: usize) -> Result<Vec<QueryHit>> {
        self.queries.lock().unwrap().push((text.to_string(), n_results));
        Ok(self.hits.iter().take(n_results).cloned().collect())
    }

    async fn get(&self, limit: Option<usize>) -> Result<Vec<StoredChunk>> {
        let rows = self.hits.iter().map(|h| StoredChunk { id: h.id.clone(), content: h.content.clone(), metadata: h.metadata.clone() });
        Ok(rows.take(limit.unwrap_or(usize::MAX)).collect())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.hits.len())
    }
}

/// Records every prompt; replies with `reply` or fails when `fail` is set.
pub struct RecordingGenerator {
    pub reply: String,
    pub fail: bool,
    pub prompts: Mutex<Vec<String>>,
}

impl RecordingGenerator {
    pub fn replying(reply: &str) -> Self {
        Self { reply: reply.to_string(), fail: false, prompts: Mutex::new(Vec::new()) }
    }

    pub fn failing() -> Self {
        Self { reply: String::new(), fail: true, prompts: Mutex::new(Vec::new()) }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for RecordingGenerator {
    fn model(&self) -> &str {
        "recording"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail {
            return Err(anyhow!("429 resource exhausted"));
        }
        Ok(self.reply.clone())
    }
}
