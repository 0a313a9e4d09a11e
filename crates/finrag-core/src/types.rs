//! Domain types shared by the ingestion and query flows.

use serde::{Deserialize, Serialize};

pub type ChunkId = String;

/// Metadata stored next to every chunk.
///
/// `source` is an origin locator such as `file://data/itr.txt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub source: String,
}

impl ChunkMetadata {
    pub fn for_file(path: &std::path::Path) -> Self {
        Self { source: format!("file://{}", path.display()) }
    }
}

/// A chunk of a source document ready to be written to the collection.
///
/// - `id`: `doc_<file_index>_<chunk_index>`, unique within a run
/// - `content`: the cleaned text payload, never empty
/// - `metadata`: origin of the chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: ChunkId,
    pub content: String,
    pub metadata: ChunkMetadata,
}

impl DocumentChunk {
    pub fn make_id(file_index: usize, chunk_index: usize) -> ChunkId {
        format!("doc_{file_index}_{chunk_index}")
    }
}

/// One row returned by a similarity query.
///
/// `distance` is engine-specific but lower is always closer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryHit {
    pub id: ChunkId,
    pub content: String,
    pub metadata: ChunkMetadata,
    pub distance: f32,
}

/// A row read back from the collection without a query vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredChunk {
    pub id: ChunkId,
    pub content: String,
    pub metadata: ChunkMetadata,
}
