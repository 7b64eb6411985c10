use crate::llm::LLMClient;
use crate::types::{CatchyTitle, Paper, Result};
use std::sync::Arc;

const SUMMARY_EXCERPT_CHARS: usize = 500;

pub fn catchy_title_prompt(title: &str, summary: &str) -> String {
    let excerpt: String = summary.chars().take(SUMMARY_EXCERPT_CHARS).collect();
    format!(
        "You are a creative science communicator.\n\
         The paper title is: \"{}\".\n\
         The abstract/summary is: \"{}\".\n\n\
         Task: Rewrite the title into a **catchy, curiosity-driven version** (like a YouTube headline, but still accurate).\n\
         Return only one catchy title.",
        title, excerpt
    )
}

/// Trim the reply and drop one layer of surrounding quotes.
pub fn clean_title(reply: &str) -> String {
    let trimmed = reply.trim();
    for (open, close) in [('"', '"'), ('\'', '\''), ('\u{201c}', '\u{201d}'), ('*', '*')] {
        if let Some(inner) = trimmed
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
        {
            return inner.trim().to_string();
        }
    }
    trimmed.to_string()
}

/// Rewrites paper titles into headline-style ones, one model call per paper.
pub struct TitleRewriter {
    llm: Arc<dyn LLMClient>,
}

impl TitleRewriter {
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self { llm }
    }

    /// Rewrite the titles of the first `limit` papers, in order.
    pub async fn rewrite(&self, papers: &[Paper], limit: usize) -> Result<Vec<CatchyTitle>> {
        let mut titles = Vec::with_capacity(limit.min(papers.len()));
        for paper in papers.iter().take(limit) {
            let reply = self
                .llm
                .generate(&catchy_title_prompt(&paper.title, &paper.summary))
                .await?;
            titles.push(CatchyTitle {
                original: paper.title.clone(),
                catchy: clean_title(&reply),
            });
        }
        tracing::info!(count = titles.len(), "Rewrote paper titles");
        Ok(titles)
    }
}
