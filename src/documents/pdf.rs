use crate::types::{AppError, Result};
use std::path::Path;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Cheap header check before handing bytes to the parser.
pub fn looks_like_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(PDF_MAGIC)
}

/// Extract the text layer of an in-memory PDF.
///
/// Parsing runs on the blocking pool. The parser panics on some malformed
/// inputs, so panics are caught and reported as [`AppError::Pdf`].
pub async fn extract_text(bytes: Vec<u8>) -> Result<String> {
    if !looks_like_pdf(&bytes) {
        return Err(AppError::Pdf("Invalid or corrupted PDF file.".to_string()));
    }

    let size = bytes.len();
    let started = std::time::Instant::now();

    let text = tokio::task::spawn_blocking(move || {
        std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(&bytes))
    })
    .await
    .map_err(|e| AppError::Internal(format!("PDF extraction task failed: {}", e)))?
    .map_err(|_| AppError::Pdf("Invalid or corrupted PDF file.".to_string()))?
    .map_err(|e| AppError::Pdf(format!("Failed to extract text from PDF: {}", e)))?;

    let text = text.replace('\0', "");
    tracing::debug!(
        bytes = size,
        chars = text.len(),
        duration_ms = started.elapsed().as_millis() as u64,
        "Extracted PDF text"
    );
    Ok(text)
}

/// Read and extract a PDF from disk.
pub async fn read_pdf(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AppError::Pdf(format!("PDF file not found: {}", path.display()))
        } else {
            AppError::Pdf(format!("Failed to read {}: {}", path.display(), e))
        }
    })?;
    extract_text(bytes).await
}
