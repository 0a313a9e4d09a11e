use std::io;

use finrag_cli::{init_logging, load_config};
use finrag_rag::context::open_collection;
use finrag_rag::diagnostics::{write_collection_report, write_probe_report, PROBE_QUERY};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let config = load_config()?;
    let settings = config.settings();
    let query = std::env::args().nth(1).unwrap_or_else(|| PROBE_QUERY.to_string());

    let store = open_collection(settings).await?;
    let mut out = io::stdout().lock();
    write_collection_report(&store, &mut out).await?;
    write_probe_report(&store, &query, settings.rag.n_results, &mut out).await?;
    Ok(())
}
