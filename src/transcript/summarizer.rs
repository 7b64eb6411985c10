use crate::llm::LLMClient;
use crate::types::{AppError, Result};
use std::sync::Arc;

/// Prompt prefix shared by transcript summaries and the knowledge-graph
/// pre-summary.
pub const RESEARCH_SUMMARY_PROMPT: &str = "Summarize the following text in relevant points such that they would be important for someone with a research background \n\n";

pub fn build_prompt(text: &str) -> String {
    format!("{}{}", RESEARCH_SUMMARY_PROMPT, text)
}

pub struct TranscriptSummarizer {
    llm: Arc<dyn LLMClient>,
}

impl TranscriptSummarizer {
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self { llm }
    }

    /// Research-oriented point summary of `text`.
    pub async fn summarize(&self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Nothing to summarize: the transcript is empty".to_string(),
            ));
        }

        let summary = self.llm.generate(&build_prompt(text)).await?;
        if summary.trim().is_empty() {
            return Err(AppError::LLM(
                "Response text is empty, but not blocked".to_string(),
            ));
        }

        tracing::info!(
            input_chars = text.len(),
            summary_chars = summary.len(),
            "Summarized transcript"
        );
        Ok(summary)
    }
}
