use anyhow::Result;

use finrag_core::config::RagSettings;
use finrag_core::traits::{ChunkStore, TextGenerator};
use finrag_core::types::QueryHit;

use crate::prompt::{fallback_prompt, grounded_prompt, join_context};

/// How many chunks to fetch and how close they must be to count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetrievalPolicy {
    pub n_results: usize,
    pub similarity_threshold: f32,
}

impl Default for RetrievalPolicy {
    fn default() -> Self {
        Self::from(&RagSettings::default())
    }
}

impl From<&RagSettings> for RetrievalPolicy {
    fn from(s: &RagSettings) -> Self {
        Self { n_results: s.n_results, similarity_threshold: s.similarity_threshold }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerMode {
    Grounded,
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub text: String,
    pub mode: AnswerMode,
    /// Sources of the chunks placed in the prompt, nearest first. Empty for fallback answers.
    pub sources: Vec<String>,
}

/// Keep hits with `distance <= threshold`, preserving their order.
pub fn select_relevant(hits: Vec<QueryHit>, threshold: f32) -> Vec<QueryHit> {
    hits.into_iter().filter(|h| h.distance <= threshold).collect()
}

/// Retrieval plus generation over one collection and one model.
///
/// Built once at startup and shared by reference; holds no per-query state.
pub struct RagEngine<S, G>
where
    S: ChunkStore,
    G: TextGenerator,
{
    store: S,
    generator: G,
    policy: RetrievalPolicy,
}

impl<S, G> RagEngine<S, G>
where
    S: ChunkStore,
    G: TextGenerator,
{
    pub fn new(store: S, generator: G, policy: RetrievalPolicy) -> Self {
        Self { store, generator, policy }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn policy(&self) -> RetrievalPolicy {
        self.policy
    }

    pub async fn answer(&self, query: &str) -> Result<Answer> {
        self.answer_with(query, self.policy).await
    }

    pub async fn answer_with(&self, query: &str, policy: RetrievalPolicy) -> Result<Answer> {
        // 1) nearest chunks
        let hits = self.store.query(query, policy.n_results).await?;
        let nearest = hits.first().map(|h| h.distance);
        // 2) relevance filter
        let relevant = select_relevant(hits, policy.similarity_threshold);
        tracing::debug!(?nearest, relevant = relevant.len(), threshold = policy.similarity_threshold, "retrieval");
        // 3) grounded or fallback prompt
        let (prompt, mode, sources) = if relevant.is_empty() {
            (fallback_prompt(query), AnswerMode::Fallback, Vec::new())
        } else {
            let context = join_context(relevant.iter().map(|h| h.content.as_str()));
            let sources = relevant.into_iter().map(|h| h.metadata.source).collect();
            (grounded_prompt(&context, query), AnswerMode::Grounded, sources)
        };
        let text = self.generator.generate(&prompt).await?;
        tracing::info!(mode = ?mode, model = self.generator.model(), "answered query");
        Ok(Answer { text, mode, sources })
    }
}
