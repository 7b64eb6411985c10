//! API request handlers.
//!
//! This module contains all HTTP request handlers organized by functionality.

/// Two-agent debate over an uploaded paper.
pub mod debate;
/// Research feed digest.
pub mod digest;
/// PDF text extraction.
pub mod documents;
/// Knowledge graph building and retrieval.
pub mod graph;
/// Health check.
pub mod health;
/// RAG summaries of uploaded or linked PDFs.
pub mod summarize;

use crate::types::{AppError, Result};
use axum::extract::Multipart;

/// A PDF received in the `file` part of a multipart form.
#[derive(Debug)]
pub struct PdfUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Read the `file` part of a multipart upload and check it names a PDF.
pub async fn read_pdf_upload(mut multipart: Multipart) -> Result<PdfUpload> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        if filename.is_empty() {
            return Err(AppError::InvalidInput("No file selected".to_string()));
        }
        if !filename.to_lowercase().ends_with(".pdf") {
            return Err(AppError::InvalidInput(
                "Only PDF files are supported".to_string(),
            ));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Failed to read upload: {}", e)))?;

        tracing::debug!(filename = %filename, bytes = bytes.len(), "Received PDF upload");
        return Ok(PdfUpload {
            filename,
            bytes: bytes.to_vec(),
        });
    }

    Err(AppError::InvalidInput(
        "No file part in the request".to_string(),
    ))
}
