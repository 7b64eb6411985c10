use crate::types::{AppError, Result};
use text_splitter::{ChunkConfig, TextSplitter};

/// Character-measured splitter with overlap between consecutive chunks.
pub struct TextChunker {
    splitter: TextSplitter<text_splitter::Characters>,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        let config = ChunkConfig::new(chunk_size)
            .with_overlap(chunk_overlap)
            .map_err(|e| AppError::Config(format!("Invalid chunking settings: {}", e)))?;

        Ok(Self {
            splitter: TextSplitter::new(config),
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn chunk(&self, text: &str) -> Vec<String> {
        self.splitter.chunks(text).map(str::to_string).collect()
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }
}

/// Keep chunks mentioning any keyword, case-insensitively. An empty keyword
/// list keeps everything.
pub fn filter_by_keywords(chunks: Vec<String>, keywords: &[String]) -> Vec<String> {
    let needles: Vec<String> = keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();

    if needles.is_empty() {
        return chunks;
    }

    chunks
        .into_iter()
        .filter(|chunk| {
            let haystack = chunk.to_lowercase();
            needles.iter().any(|n| haystack.contains(n.as_str()))
        })
        .collect()
}
