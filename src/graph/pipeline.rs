use super::extractor::GraphExtractor;
use super::model::{GraphDocument, KnowledgeGraph};
use crate::documents::extract_text;
use crate::llm::LLMClient;
use crate::rag::{filter_by_keywords, TextChunker};
use crate::transcript::TranscriptSummarizer;
use crate::types::{AppError, Result};
use crate::utils::toml_config::GraphConfig;
use std::sync::Arc;
use std::time::Instant;

/// Output of one pipeline run.
#[derive(Debug, Clone)]
pub struct GraphRun {
    pub summary: String,
    pub document: GraphDocument,
    pub graph: KnowledgeGraph,
}

/// PDF -> research summary -> knowledge graph.
pub struct GraphPipeline {
    config: GraphConfig,
    summarizer: TranscriptSummarizer,
    extractor: GraphExtractor,
}

impl GraphPipeline {
    pub fn new(llm: Arc<dyn LLMClient>, config: GraphConfig) -> Self {
        Self {
            config,
            summarizer: TranscriptSummarizer::new(llm.clone()),
            extractor: GraphExtractor::new(llm),
        }
    }

    /// `keywords` overrides the configured keyword list when non-empty.
    pub async fn run(&self, pdf_bytes: Vec<u8>, keywords: &[String]) -> Result<GraphRun> {
        let started = Instant::now();
        let text = extract_text(pdf_bytes).await?;
        self.run_text(&text, keywords)
            .await
            .inspect(|run| {
                tracing::info!(
                    nodes = run.graph.node_count(),
                    edges = run.graph.edge_count(),
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Knowledge graph pipeline complete"
                );
            })
    }

    pub async fn run_text(&self, text: &str, keywords: &[String]) -> Result<GraphRun> {
        if text.trim().is_empty() {
            return Err(AppError::Pdf(
                "Could not extract text from the PDF.".to_string(),
            ));
        }

        let keywords = if keywords.is_empty() {
            self.config.keywords.as_slice()
        } else {
            keywords
        };

        let chunker = TextChunker::new(self.config.chunk_size, self.config.chunk_overlap)?;
        let chunks = chunker.chunk(text);
        let total = chunks.len();
        let relevant = filter_by_keywords(chunks, keywords);
        tracing::debug!(total, relevant = relevant.len(), "Filtered chunks by keyword");

        if relevant.is_empty() {
            return Err(AppError::InvalidInput(
                "No part of the document matched the given keywords".to_string(),
            ));
        }

        let summary = self.summarizer.summarize(&relevant.join(" ")).await?;
        if summary.trim().is_empty() {
            return Err(AppError::LLM("Failed to generate summary".to_string()));
        }

        let document = self.extractor.extract(&summary).await?;
        let graph = KnowledgeGraph::from_document(&document);

        Ok(GraphRun {
            summary,
            document,
            graph,
        })
    }
}
