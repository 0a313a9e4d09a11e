use anyhow::Result;
use std::path::Path;

use finrag_core::data_processor::DataProcessor;
use finrag_core::traits::ChunkStore;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub files_read: usize,
    pub files_skipped: usize,
    pub chunks_added: usize,
    pub collection_size: usize,
}

/// Clean, split and write every file under `data_dir` into `store`.
///
/// Rows are keyed `doc_<file>_<chunk>`; running twice over the same folder
/// replaces rows instead of duplicating them.
pub async fn ingest_directory<S>(processor: &DataProcessor, store: &S, data_dir: &Path) -> Result<IngestReport>
where
    S: ChunkStore + ?Sized,
{
    let processed = processor.process_directory(data_dir)?;
    let mut report = IngestReport {
        files_read: processed.files_read,
        files_skipped: processed.files_skipped,
        ..IngestReport::default()
    };
    if !processed.chunks.is_empty() {
        let mut ids = Vec::with_capacity(processed.chunks.len());
        let mut documents = Vec::with_capacity(processed.chunks.len());
        let mut metadatas = Vec::with_capacity(processed.chunks.len());
        for chunk in processed.chunks {
            ids.push(chunk.id);
            documents.push(chunk.content);
            metadatas.push(chunk.metadata);
        }
        report.chunks_added = store.add(&ids, &documents, &metadatas).await?;
    }
    report.collection_size = store.count().await?;
    tracing::info!(collection = store.name(), added = report.chunks_added, total = report.collection_size, "ingestion finished");
    Ok(report)
}
