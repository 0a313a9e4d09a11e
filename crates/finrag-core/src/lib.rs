//! finrag-core
//!
//! Shared building blocks for the ingestion and query flows: configuration,
//! domain types, capability traits for the embedding model, the chunk store
//! and the text generator, plus the pure text helpers (cleaning, splitting)
//! and the data-folder reader.

pub mod clean;
pub mod config;
pub mod data_processor;
pub mod error;
pub mod splitter;
pub mod traits;
pub mod types;

pub use clean::clean_text;
pub use config::{Config, Settings};
pub use error::{Error, Result};
pub use splitter::ChunkSplitter;
pub use traits::{ChunkStore, Embedder, TextGenerator};
pub use types::{ChunkMetadata, DocumentChunk, QueryHit, StoredChunk};
