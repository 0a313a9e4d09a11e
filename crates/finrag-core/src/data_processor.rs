use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use crate::clean::clean_text;
use crate::error::Error;
use crate::splitter::ChunkSplitter;
use crate::types::{ChunkMetadata, DocumentChunk};

/// Chunks produced from one pass over a data folder.
#[derive(Debug, Default)]
pub struct ProcessedDirectory {
    pub chunks: Vec<DocumentChunk>,
    pub files_read: usize,
    pub files_skipped: usize,
}

pub struct DataProcessor {
    splitter: ChunkSplitter,
}

impl DataProcessor {
    pub fn new(splitter: ChunkSplitter) -> Self {
        Self { splitter }
    }

    /// Read, clean and split every regular file directly under `data_dir`.
    ///
    /// Files are visited in file-name order and numbered from 0. A file that
    /// cannot be read is skipped and still consumes its index, so ids of
    /// the other files do not shift between runs. Entries the walk cannot
    /// resolve, such as dangling symlinks, count as unreadable files.
    pub fn process_directory(&self, data_dir: &Path) -> Result<ProcessedDirectory> {
        if !data_dir.is_dir() {
            return Err(Error::MissingDataDir(data_dir.to_path_buf()).into());
        }
        let files = list_files(data_dir);
        let mut out = ProcessedDirectory::default();
        if files.is_empty() {
            tracing::info!(dir = %data_dir.display(), "no files to ingest");
            return Ok(out);
        }
        for (file_index, file_path) in files.iter().enumerate() {
            let content = match read_file_content(file_path) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!(file = %file_path.display(), error = %e, "skipping unreadable file");
                    out.files_skipped += 1;
                    continue;
                }
            };
            let chunks = self.chunk_content(&content, file_index, file_path);
            tracing::debug!(file = %file_path.display(), file_index, chunks = chunks.len(), "processed file {}/{}", file_index + 1, files.len());
            out.files_read += 1;
            out.chunks.extend(chunks);
        }
        tracing::info!(
            files = out.files_read,
            skipped = out.files_skipped,
            chunks = out.chunks.len(),
            chunk_size = self.splitter.size(),
            chunk_overlap = self.splitter.overlap(),
            "processed data directory"
        );
        Ok(out)
    }

    fn chunk_content(&self, content: &str, file_index: usize, file_path: &Path) -> Vec<DocumentChunk> {
        let cleaned = clean_text(content);
        let metadata = ChunkMetadata::for_file(file_path);
        self.splitter
            .split(&cleaned)
            .filter(|c| !c.is_empty())
            .enumerate()
            .map(|(chunk_index, text)| DocumentChunk {
                id: DocumentChunk::make_id(file_index, chunk_index),
                content: text.to_string(),
                metadata: metadata.clone(),
            })
            .collect()
    }
}

/// Invalid UTF-8 is replaced rather than failing the file.
fn read_file_content(file_path: &Path) -> std::io::Result<String> {
    let bytes = fs::read(file_path)?;
    Ok(match String::from_utf8(bytes) {
        Ok(content) => content,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}

/// Regular files directly under `root`, sorted. Entries whose type cannot be
/// resolved are kept so the reader reports and skips them.
fn list_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) if e.file_type().is_file() => Some(e.into_path()),
            Ok(_) => None,
            Err(e) => e.path().map(Path::to_path_buf),
        })
        .collect();
    files.sort();
    files
}
