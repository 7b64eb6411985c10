//! Retrieval-augmented summarization
//!
//! The pipeline is a straight call sequence: split the document into
//! overlapping character windows, embed them, pick the windows closest to a
//! fixed summary query, and hand those to the model.
//!
//! - [`chunker`] - character splitter and keyword filter
//! - [`embeddings`] - Gemini and local embedding providers
//! - [`retriever`] - per-document similarity index
//! - [`cache`] - LRU of finished summaries keyed by document hash
//! - [`summarizer`] - the end-to-end PDF summarizer

pub mod cache;
pub mod chunker;
pub mod embeddings;
pub mod retriever;
pub mod summarizer;

pub use cache::SummaryCache;
pub use chunker::{filter_by_keywords, TextChunker};
pub use embeddings::{create_embedder, Embedder};
pub use retriever::Retriever;
pub use summarizer::PdfSummarizer;
