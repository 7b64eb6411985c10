use crate::documents::{fetch, pdf};
use crate::llm::{GenerationParams, LLMClient};
use crate::rag::cache::SummaryCache;
use crate::rag::chunker::TextChunker;
use crate::rag::embeddings::Embedder;
use crate::rag::retriever::Retriever;
use crate::types::{AppError, Result};
use crate::utils::toml_config::RagConfig;
use std::sync::Arc;
use std::time::Instant;

/// Query used to pick the chunks that go into the summary prompt.
pub const SUMMARY_QUERY: &str = "Provide a concise and accurate summary of the document, focusing on the main points, arguments, and key findings. Ensure the summary is comprehensive.";

const EMPTY_UPLOAD: &str = "Could not extract text from PDF. The file might be empty, password-protected, or contain only images.";
const EMPTY_DOWNLOAD: &str = "Could not extract text from the PDF at the URL.";

/// Build the final summarization prompt around the retrieved context.
pub fn build_prompt(context: &str) -> String {
    format!(
        "Based on the following excerpts from a document, provide a concise and accurate summary.\n\
         Focus on the main points, arguments, and key findings. Ensure the summary is comprehensive yet brief.\n\n\
         Context:\n{}\n\n\
         Summary:",
        context
    )
}

/// Cut `text` to at most `max_chars` characters without splitting one.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Retrieval-augmented PDF summarizer.
pub struct PdfSummarizer {
    llm: Arc<dyn LLMClient>,
    embedder: Arc<dyn Embedder>,
    cache: Arc<SummaryCache>,
    config: RagConfig,
}

impl PdfSummarizer {
    pub fn new(
        llm: Arc<dyn LLMClient>,
        embedder: Arc<dyn Embedder>,
        cache: Arc<SummaryCache>,
        config: RagConfig,
    ) -> Self {
        Self {
            llm,
            embedder,
            cache,
            config,
        }
    }

    /// Summarize an uploaded PDF.
    pub async fn summarize_bytes(&self, bytes: Vec<u8>) -> Result<String> {
        self.summarize_pdf(bytes, EMPTY_UPLOAD).await
    }

    /// Download a PDF and summarize it.
    pub async fn summarize_url(&self, http: &reqwest::Client, raw_url: &str) -> Result<String> {
        let url = fetch::validate_pdf_url(raw_url)?;
        let bytes = fetch::download(http, &url).await?;
        self.summarize_pdf(bytes, EMPTY_DOWNLOAD).await
    }

    async fn summarize_pdf(&self, bytes: Vec<u8>, empty_message: &str) -> Result<String> {
        let key = SummaryCache::compute_key(&bytes);
        if let Some(summary) = self.cache.get(&key) {
            tracing::info!(key = %&key[..12], "Summary cache hit");
            return Ok(summary);
        }

        let text = pdf::extract_text(bytes).await?;
        if text.trim().is_empty() {
            return Err(AppError::InvalidInput(empty_message.to_string()));
        }

        let summary = self.summarize_text(&text).await?;
        self.cache.insert(key, summary.clone());
        Ok(summary)
    }

    /// Chunk, index, retrieve and summarize already-extracted text.
    pub async fn summarize_text(&self, text: &str) -> Result<String> {
        let started = Instant::now();

        let chunker = TextChunker::new(self.config.chunk_size, self.config.chunk_overlap)?;
        let chunks = chunker.chunk(text);
        let chunk_count = chunks.len();

        let retriever =
            Retriever::build_with_metric(Arc::clone(&self.embedder), chunks, self.config.metric)
                .await?;
        let top = retriever.retrieve(SUMMARY_QUERY, self.config.top_k).await?;

        let context = top.join("\n\n");
        let context = truncate_chars(&context, self.config.max_context_chars);
        let prompt = build_prompt(context);

        let params = GenerationParams::new(self.config.temperature, self.config.max_output_tokens);
        let summary = self.llm.generate_with_params(&prompt, &params).await?;

        tracing::info!(
            chunks = chunk_count,
            retrieved = top.len(),
            context_chars = context.chars().count(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Summarized document"
        );

        Ok(summary)
    }
}
