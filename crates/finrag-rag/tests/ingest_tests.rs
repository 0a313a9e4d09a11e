mod common;

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use common::RecordingGenerator;
use finrag_core::data_processor::DataProcessor;
use finrag_core::splitter::ChunkSplitter;
use finrag_core::traits::ChunkStore;
use finrag_embed::{HashEmbedder, MINILM_DIM};
use finrag_rag::diagnostics::{write_collection_report, write_probe_report, PROBE_QUERY};
use finrag_rag::prompt::fallback_prompt;
use finrag_rag::{ingest_directory, AnswerMode, RagEngine, RetrievalPolicy};
use finrag_vector::LanceCollection;
use tempfile::TempDir;

async fn collection(db: &Path) -> LanceCollection {
    LanceCollection::get_or_create(db, "finance_collection", Box::new(HashEmbedder::new(MINILM_DIM)))
        .await
        .expect("collection")
}

fn processor() -> DataProcessor {
    DataProcessor::new(ChunkSplitter::new(800, 100).expect("splitter"))
}

#[tokio::test]
async fn ingest_long_file_then_reingest() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path().join("data");
    fs::create_dir(&data).unwrap();
    fs::write(data.join("itr.txt"), "A. ".repeat(500)).unwrap();
    fs::write(data.join("regimes.txt"), "The new regime has lower slabs.\n\nThe old regime keeps 80C deductions. See https://incometax.gov.in").unwrap();
    let store = collection(&tmp.path().join("store")).await;

    let report = ingest_directory(&processor(), &store, &data).await.expect("ingest");
    assert_eq!(report.files_read, 2);
    assert!(report.chunks_added >= 3, "long file splits in two or more, short file in one");
    assert_eq!(report.collection_size, report.chunks_added);

    let rows = store.get(None).await.unwrap();
    let ids: HashSet<String> = rows.iter().map(|r| r.id.clone()).collect();
    assert_eq!(ids.len(), report.chunks_added);
    assert!(ids.contains("doc_0_0") && ids.contains("doc_0_1") && ids.contains("doc_1_0"));
    for row in &rows {
        let name = if row.id.starts_with("doc_0_") { "itr.txt" } else { "regimes.txt" };
        assert_eq!(row.metadata.source, format!("file://{}", data.join(name).display()));
        assert!(!row.content.contains("https://"));
    }

    let again = ingest_directory(&processor(), &store, &data).await.expect("reingest");
    assert_eq!(again.chunks_added, report.chunks_added);
    assert_eq!(again.collection_size, report.collection_size, "same ids are replaced, not duplicated");
}

#[tokio::test]
async fn empty_folder_adds_nothing() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path().join("data");
    fs::create_dir(&data).unwrap();
    let store = collection(&tmp.path().join("store")).await;
    let report = ingest_directory(&processor(), &store, &data).await.expect("ingest");
    assert_eq!(report.chunks_added, 0);
    assert_eq!(report.collection_size, 0);
}

#[tokio::test]
async fn query_against_empty_collection_falls_back() {
    let tmp = TempDir::new().unwrap();
    let store = collection(tmp.path()).await;
    let engine = RagEngine::new(store, RecordingGenerator::replying("Use the e-filing portal."), RetrievalPolicy::default());

    let answer = engine.answer(PROBE_QUERY).await.expect("answer");
    assert_eq!(answer.mode, AnswerMode::Fallback);
    assert_eq!(answer.text, "Use the e-filing portal.");
    assert_eq!(engine.generator().prompts(), vec![fallback_prompt(PROBE_QUERY)]);
}

#[tokio::test]
async fn ingested_text_grounds_identical_query() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path().join("data");
    fs::create_dir(&data).unwrap();
    fs::write(data.join("itr.txt"), "How to file ITR for FY 2024-25?").unwrap();
    let store = collection(&tmp.path().join("store")).await;
    ingest_directory(&processor(), &store, &data).await.expect("ingest");

    let engine = RagEngine::new(store, RecordingGenerator::replying("grounded"), RetrievalPolicy::default());
    let answer = engine.answer(PROBE_QUERY).await.expect("answer");
    assert_eq!(answer.mode, AnswerMode::Grounded, "identical text has zero distance");
    assert!(engine.generator().prompts()[0].contains("How to file ITR for FY 2024-25?\n\nUser question:"));
}

#[tokio::test]
async fn diagnostics_report_size_samples_and_probe() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path().join("data");
    fs::create_dir(&data).unwrap();
    for i in 0..7 {
        fs::write(data.join(format!("f{i}.txt")), format!("document number {i} about taxes")).unwrap();
    }
    let store = collection(&tmp.path().join("store")).await;
    ingest_directory(&processor(), &store, &data).await.expect("ingest");

    let mut out = Vec::new();
    let total = write_collection_report(&store, &mut out).await.unwrap();
    let hits = write_probe_report(&store, PROBE_QUERY, 3, &mut out).await.unwrap();
    let text = String::from_utf8(out).unwrap();

    assert_eq!(total, 7);
    assert_eq!(hits, 3);
    assert!(text.contains("Collection 'finance_collection': 7 documents"));
    assert_eq!(text.matches("Content (first 200 chars)").count(), 5);
    assert_eq!(text.matches("Distance: ").count(), 3);
}
