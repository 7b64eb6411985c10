use super::{collapse_whitespace, FeedSource};
use crate::types::{AppError, Paper, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

pub const DEFAULT_SEMANTIC_SCHOLAR_URL: &str = "https://api.semanticscholar.org/graph/v1";

const FIELDS: &str = "title,abstract,authors,url,publicationDate";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchHit {
    #[serde(default)]
    paper_id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default, rename = "abstract")]
    abstract_text: Option<String>,
    #[serde(default)]
    authors: Vec<Author>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    publication_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Author {
    #[serde(default)]
    name: String,
}

impl From<SearchHit> for Paper {
    fn from(hit: SearchHit) -> Self {
        let published = hit
            .publication_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc());
        let link = hit.url.unwrap_or_else(|| {
            format!("https://www.semanticscholar.org/paper/{}", hit.paper_id)
        });

        Paper {
            source: "Semantic Scholar".to_string(),
            title: collapse_whitespace(hit.title.as_deref().unwrap_or_default()),
            authors: hit.authors.into_iter().map(|a| a.name).collect(),
            summary: collapse_whitespace(hit.abstract_text.as_deref().unwrap_or_default()),
            link,
            published,
        }
    }
}

/// Semantic Scholar Graph API paper search. The date filter is applied by
/// the API (`publicationDateOrYear=<cutoff>:`) and again locally for papers
/// that carry a full date.
pub struct SemanticScholarSource {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl SemanticScholarSource {
    pub fn new(http: reqwest::Client, base_url: Option<&str>) -> Self {
        Self {
            http,
            base_url: base_url
                .unwrap_or(DEFAULT_SEMANTIC_SCHOLAR_URL)
                .trim_end_matches('/')
                .to_string(),
            api_key: std::env::var("SEMANTIC_SCHOLAR_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
        }
    }
}

#[async_trait]
impl FeedSource for SemanticScholarSource {
    fn name(&self) -> &'static str {
        "Semantic Scholar"
    }

    async fn fetch(
        &self,
        query: &str,
        max_results: usize,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Paper>> {
        let date_filter = format!("{}:", cutoff.format("%Y-%m-%d"));
        let limit = max_results.min(100).to_string();

        let mut request = self
            .http
            .get(format!("{}/paper/search", self.base_url))
            .query(&[
                ("query", query),
                ("limit", limit.as_str()),
                ("fields", FIELDS),
                ("publicationDateOrYear", date_filter.as_str()),
            ]);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Feed(format!("Semantic Scholar request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Feed(format!(
                "Semantic Scholar returned HTTP {}",
                response.status()
            )));
        }

        let body: SearchResponse = response.json().await.map_err(|e| {
            AppError::Feed(format!("Invalid Semantic Scholar response: {}", e))
        })?;

        // Date-only values compare at midnight, so keep the whole cutoff day
        let cutoff_day = cutoff.date_naive();
        Ok(body
            .data
            .into_iter()
            .map(Paper::from)
            .filter(|p| p.published.is_none_or(|d| d.date_naive() >= cutoff_day))
            .collect())
    }
}
