use super::{collapse_whitespace, FeedSource};
use crate::types::{AppError, Paper, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

pub const DEFAULT_PUBMED_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    esearchresult: SearchResult,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    idlist: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SummaryEnvelope {
    result: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct DocSummary {
    #[serde(default)]
    title: String,
    #[serde(default)]
    authors: Vec<DocAuthor>,
    #[serde(default)]
    sortpubdate: String,
}

#[derive(Debug, Deserialize)]
struct DocAuthor {
    #[serde(default)]
    name: String,
}

/// Number of whole days covering `hours`, at least one.
pub fn reldate_days(hours: i64) -> i64 {
    ((hours + 23) / 24).max(1)
}

fn parse_sortpubdate(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw.trim(), "%Y/%m/%d %H:%M")
        .ok()
        .map(|dt| dt.and_utc())
}

fn summary_to_paper(id: &str, doc: DocSummary) -> Paper {
    Paper {
        source: "PubMed".to_string(),
        title: collapse_whitespace(&doc.title),
        authors: doc.authors.into_iter().map(|a| a.name).collect(),
        // esummary carries no abstract
        summary: String::new(),
        link: format!("https://pubmed.ncbi.nlm.nih.gov/{}/", id),
        published: parse_sortpubdate(&doc.sortpubdate),
    }
}

/// NCBI E-utilities: `esearch` for recent ids, then `esummary` for details.
pub struct PubMedSource {
    http: reqwest::Client,
    base_url: String,
}

impl PubMedSource {
    pub fn new(http: reqwest::Client, base_url: Option<&str>) -> Self {
        Self {
            http,
            base_url: base_url
                .unwrap_or(DEFAULT_PUBMED_URL)
                .trim_end_matches('/')
                .to_string(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let response = self
            .http
            .get(format!("{}/{}", self.base_url, endpoint))
            .query(params)
            .send()
            .await
            .map_err(|e| AppError::Feed(format!("PubMed {} failed: {}", endpoint, e)))?;

        if !response.status().is_success() {
            return Err(AppError::Feed(format!(
                "PubMed {} returned HTTP {}",
                endpoint,
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Feed(format!("Invalid PubMed {} response: {}", endpoint, e)))
    }
}

#[async_trait]
impl FeedSource for PubMedSource {
    fn name(&self) -> &'static str {
        "PubMed"
    }

    async fn fetch(
        &self,
        query: &str,
        max_results: usize,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Paper>> {
        let hours = (Utc::now() - cutoff).num_hours();
        let reldate = reldate_days(hours).to_string();
        let retmax = max_results.to_string();

        let search: SearchEnvelope = self
            .get_json(
                "esearch.fcgi",
                &[
                    ("db", "pubmed"),
                    ("term", query),
                    ("retmax", retmax.as_str()),
                    ("retmode", "json"),
                    ("sort", "pub_date"),
                    ("datetype", "pdat"),
                    ("reldate", reldate.as_str()),
                ],
            )
            .await?;

        let ids = search.esearchresult.idlist;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let joined = ids.join(",");
        let summary: SummaryEnvelope = self
            .get_json(
                "esummary.fcgi",
                &[("db", "pubmed"), ("id", joined.as_str()), ("retmode", "json")],
            )
            .await?;

        let mut papers = Vec::with_capacity(ids.len());
        for id in &ids {
            let Some(value) = summary.result.get(id) else {
                tracing::debug!(id = %id, "PubMed summary missing for id");
                continue;
            };
            let doc: DocSummary = serde_json::from_value(value.clone()).unwrap_or_default();
            papers.push(summary_to_paper(id, doc));
        }
        Ok(papers)
    }
}
