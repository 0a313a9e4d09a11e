//! Startup wiring: settings in, collection / engine / processor out.

use anyhow::Result;

use finrag_core::config::Settings;
use finrag_core::data_processor::DataProcessor;
use finrag_core::splitter::ChunkSplitter;
use finrag_embed::get_default_embedder;
use finrag_llm::GeminiClient;
use finrag_vector::LanceCollection;

use crate::engine::{RagEngine, RetrievalPolicy};

pub type FinanceEngine = RagEngine<LanceCollection, GeminiClient>;

pub async fn open_collection(settings: &Settings) -> Result<LanceCollection> {
    let embedder = get_default_embedder()?;
    LanceCollection::get_or_create(&settings.store_path(), &settings.store.collection, embedder).await
}

pub fn build_processor(settings: &Settings) -> Result<DataProcessor> {
    let splitter = ChunkSplitter::new(settings.chunking.size, settings.chunking.overlap)?;
    Ok(DataProcessor::new(splitter))
}

pub async fn build_engine(settings: &Settings) -> Result<FinanceEngine> {
    let store = open_collection(settings).await?;
    let generator = GeminiClient::new(&settings.llm)?;
    Ok(RagEngine::new(store, generator, RetrievalPolicy::from(&settings.rag)))
}
