//! Video transcripts: fetching, loading from disk, and summarizing.

pub mod summarizer;
pub mod youtube;

use crate::types::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use summarizer::{TranscriptSummarizer, RESEARCH_SUMMARY_PROMPT};
pub use youtube::{extract_video_id, TranscriptFetcher};

/// One caption line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSnippet {
    pub text: String,
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub duration: f64,
}

/// Join snippet texts with single spaces.
pub fn transcript_to_text(snippets: &[TranscriptSnippet]) -> String {
    snippets
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Load a transcript saved as a JSON array of snippets, or as plain text.
pub async fn load_transcript_file(path: &Path) -> Result<Vec<TranscriptSnippet>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AppError::Transcript(format!("Failed to read {}: {}", path.display(), e)))?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        return serde_json::from_str(&content).map_err(|e| {
            AppError::Transcript(format!("Invalid transcript JSON in {}: {}", path.display(), e))
        });
    }

    let text = content.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }
    Ok(vec![TranscriptSnippet {
        text: text.to_string(),
        start: 0.0,
        duration: 0.0,
    }])
}
