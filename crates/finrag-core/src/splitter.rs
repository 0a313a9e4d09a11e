//! Character-bounded chunking with overlap.
//!
//! Wraps `text_splitter::TextSplitter`, which prefers paragraph, sentence and
//! word boundaries and only falls back to hard splits when a single unit is
//! larger than the chunk size.

use text_splitter::{Characters, ChunkConfig, TextSplitter};

use crate::error::{Error, Result};

pub const DEFAULT_CHUNK_SIZE: usize = 800;
pub const DEFAULT_CHUNK_OVERLAP: usize = 100;

pub struct ChunkSplitter {
    size: usize,
    overlap: usize,
    inner: TextSplitter<Characters>,
}

impl ChunkSplitter {
    pub fn new(size: usize, overlap: usize) -> Result<Self> {
        if size == 0 {
            return Err(Error::InvalidConfig("chunk size must be positive".into()));
        }
        let config = ChunkConfig::new(size)
            .with_overlap(overlap)
            .map_err(|e| Error::InvalidConfig(format!("chunk overlap {overlap} vs size {size}: {e}")))?;
        Ok(Self { size, overlap, inner: TextSplitter::new(config) })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Lazily split `text`. Calling again restarts from the beginning.
    pub fn split<'s, 't: 's>(&'s self, text: &'t str) -> impl Iterator<Item = &'t str> + 's {
        self.inner.chunks(text)
    }

    /// Like [`split`](Self::split) but also yields each chunk's byte offset in `text`.
    pub fn split_indices<'s, 't: 's>(&'s self, text: &'t str) -> impl Iterator<Item = (usize, &'t str)> + 's {
        self.inner.chunk_indices(text)
    }
}
