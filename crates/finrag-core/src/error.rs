use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("data directory not found: {}", .0.display())]
    MissingDataDir(PathBuf),

    #[error("collection '{collection}' holds {} vectors, embedder produces {expected}-dim", dim_label(.stored))]
    DimensionMismatch { collection: String, stored: Option<i32>, expected: usize },
}

fn dim_label(stored: &Option<i32>) -> String {
    match stored {
        Some(dim) => format!("{dim}-dim"),
        None => "non-vector".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, Error>;
