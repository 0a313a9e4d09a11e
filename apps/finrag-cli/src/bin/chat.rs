use std::io;

use finrag_cli::{init_logging, load_config};
use finrag_rag::context::build_engine;
use finrag_rag::run_chat;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let config = load_config()?;
    let settings = config.settings();
    let engine = build_engine(settings).await?;
    println!("Personal finance advisor ({}). Type 'exit' or 'quit' to leave.", settings.llm.model);
    let answered = run_chat(&engine, io::stdin().lock(), io::stdout().lock()).await?;
    tracing::info!(answered, "chat session ended");
    Ok(())
}
