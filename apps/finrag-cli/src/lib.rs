//! Shared setup for the finrag binaries.

use finrag_core::config::Config;
use tracing_subscriber::EnvFilter;

/// Log to stderr, filtered by `RUST_LOG` (default `warn`).
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

pub fn load_config() -> anyhow::Result<Config> {
    Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })
}
