use std::{env, io, path::PathBuf};

use finrag_cli::{init_logging, load_config};
use finrag_rag::context::{build_processor, open_collection};
use finrag_rag::diagnostics::{write_collection_report, write_probe_report, PROBE_QUERY};
use finrag_rag::ingest_directory;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let config = load_config()?;
    let settings = config.settings();
    let mut check = false;
    let mut data_dir = None;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--check" | "-c" => check = true,
            "--help" | "-h" => {
                println!("Usage: finrag-ingest [DATA_DIR] [--check]");
                return Ok(());
            }
            _ if !arg.starts_with('-') => data_dir = Some(PathBuf::from(&arg)),
            _ => {
                eprintln!("Error: unknown flag {}", arg);
                std::process::exit(1);
            }
        }
    }
    let data_dir = data_dir.unwrap_or_else(|| settings.data_dir());

    println!("Ingesting documents from {}", data_dir.display());
    let processor = build_processor(settings)?;
    let store = open_collection(settings).await?;
    let report = ingest_directory(&processor, &store, &data_dir).await?;
    if report.files_skipped > 0 {
        println!("⚠️  Skipped {} unreadable files", report.files_skipped);
    }
    println!("{} new chunks added to collection '{}'", report.chunks_added, settings.store.collection);
    println!("📊 {} files read, {} rows in collection", report.files_read, report.collection_size);

    if check {
        let mut out = io::stdout().lock();
        write_collection_report(&store, &mut out).await?;
        write_probe_report(&store, PROBE_QUERY, settings.rag.n_results, &mut out).await?;
    }
    Ok(())
}
