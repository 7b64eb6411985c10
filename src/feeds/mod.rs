//! Recent research feeds and the paper digest
//!
//! Each [`FeedSource`] returns papers published after a cutoff. A
//! [`Digest`] queries every configured source and concatenates the
//! results; a source that fails is logged and left out.

pub mod arxiv;
pub mod pubmed;
pub mod semantic_scholar;
pub mod titles;

use crate::types::{AppError, Paper, Result};
use crate::utils::toml_config::DigestConfig;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

pub use arxiv::ArxivSource;
pub use pubmed::PubMedSource;
pub use semantic_scholar::SemanticScholarSource;
pub use titles::TitleRewriter;

#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Display name, also used as `Paper::source`
    fn name(&self) -> &'static str;

    async fn fetch(
        &self,
        query: &str,
        max_results: usize,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Paper>>;
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Build the sources named in the config, in order.
pub fn create_sources(
    config: &DigestConfig,
    http: &reqwest::Client,
) -> Result<Vec<Box<dyn FeedSource>>> {
    config
        .sources
        .iter()
        .map(|name| -> Result<Box<dyn FeedSource>> {
            match name.as_str() {
                "arxiv" => Ok(Box::new(ArxivSource::new(
                    http.clone(),
                    config.arxiv_url.as_deref(),
                ))),
                "semantic_scholar" => Ok(Box::new(SemanticScholarSource::new(
                    http.clone(),
                    config.semantic_scholar_url.as_deref(),
                ))),
                "pubmed" => Ok(Box::new(PubMedSource::new(
                    http.clone(),
                    config.pubmed_url.as_deref(),
                ))),
                other => Err(AppError::Config(format!("Unknown feed source: {}", other))),
            }
        })
        .collect()
}

pub struct Digest {
    sources: Vec<Box<dyn FeedSource>>,
}

impl Digest {
    pub fn new(sources: Vec<Box<dyn FeedSource>>) -> Self {
        Self { sources }
    }

    pub fn from_config(config: &DigestConfig, http: &reqwest::Client) -> Result<Self> {
        Ok(Self::new(create_sources(config, http)?))
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Papers from every source published within the last `hours_back`
    /// hours. Fails only when every source failed.
    pub async fn collect(
        &self,
        query: &str,
        max_results: usize,
        hours_back: i64,
    ) -> Result<Vec<Paper>> {
        let cutoff = cutoff_before(Utc::now(), hours_back)?;
        let mut papers = Vec::new();
        let mut failures = Vec::new();

        for source in &self.sources {
            match source.fetch(query, max_results, cutoff).await {
                Ok(found) => {
                    tracing::info!(source = source.name(), count = found.len(), "Fetched papers");
                    papers.extend(found);
                }
                Err(e) => {
                    tracing::warn!(source = source.name(), error = %e, "Feed source failed, skipping");
                    failures.push(format!("{}: {}", source.name(), e));
                }
            }
        }

        if !self.sources.is_empty() && failures.len() == self.sources.len() {
            return Err(AppError::Feed(format!(
                "All feed sources failed: {}",
                failures.join("; ")
            )));
        }

        tracing::info!(total = papers.len(), "Digest collected");
        Ok(papers)
    }
}

/// `now` minus `hours_back` hours, rejecting windows chrono cannot represent.
pub fn cutoff_before(now: DateTime<Utc>, hours_back: i64) -> Result<DateTime<Utc>> {
    Duration::try_hours(hours_back)
        .and_then(|window| now.checked_sub_signed(window))
        .ok_or_else(|| AppError::InvalidInput("hours_back is too large".to_string()))
}

/// Terminal block for one paper, ending with an 80-dash separator.
pub fn format_paper(paper: &Paper, preview_chars: usize) -> String {
    let published = paper
        .published
        .map(|d| d.to_rfc3339())
        .unwrap_or_else(|| "unknown".to_string());
    let summary = if paper.summary.is_empty() {
        "No summary available".to_string()
    } else {
        let preview: String = paper.summary.chars().take(preview_chars).collect();
        format!("Summary: {}...", preview)
    };

    format!(
        "[{}] {}\nPublished: {}\nAuthors: {}\nLink: {}\n{}\n{}\n",
        paper.source,
        paper.title,
        published,
        paper.authors.join(", "),
        paper.link,
        summary,
        "-".repeat(80)
    )
}
