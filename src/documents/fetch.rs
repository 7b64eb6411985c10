use crate::types::{AppError, Result};
use url::Url;

const INVALID_URL: &str =
    "Invalid URL. Please provide a complete web address (e.g., https://example.com/file.pdf).";
const NOT_A_PDF: &str = "The provided URL does not appear to link to a PDF file.";

/// Check that `raw` is an absolute URL whose path ends in `.pdf`.
pub fn validate_pdf_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|_| AppError::InvalidInput(INVALID_URL.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none_or(str::is_empty) {
        return Err(AppError::InvalidInput(INVALID_URL.to_string()));
    }

    if !url.path().to_ascii_lowercase().ends_with(".pdf") {
        return Err(AppError::InvalidInput(NOT_A_PDF.to_string()));
    }

    Ok(url)
}

/// Download a document and return its bytes.
pub async fn download(client: &reqwest::Client, url: &Url) -> Result<Vec<u8>> {
    tracing::info!(url = %url, "Downloading document");

    let response = client.get(url.clone()).send().await.map_err(|e| {
        AppError::Fetch(format!("Failed to download the file from the URL: {}", e))
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::Fetch(format!(
            "Failed to download the file from the URL: HTTP {}",
            status
        )));
    }

    let bytes = response.bytes().await.map_err(|e| {
        AppError::Fetch(format!("Failed to download the file from the URL: {}", e))
    })?;

    tracing::debug!(bytes = bytes.len(), "Download complete");
    Ok(bytes.to_vec())
}
