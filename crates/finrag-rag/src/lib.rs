//! finrag-rag
//!
//! The orchestration layer: ingestion into the collection, the
//! retrieve-then-generate query engine with its relevance fallback, the
//! interactive loop, and a collection sanity report.

pub mod chat;
pub mod context;
pub mod diagnostics;
pub mod engine;
pub mod ingest;
pub mod prompt;

pub use chat::run_chat;
pub use engine::{Answer, AnswerMode, RagEngine, RetrievalPolicy};
pub use ingest::{ingest_directory, IngestReport};
