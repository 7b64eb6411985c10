use super::read_pdf_upload;
use crate::{
    documents::extract_text,
    types::{ExtractPdfResponse, Result, TextStats},
};
use axum::{extract::Multipart, Json};

/// Extract the text of an uploaded PDF
#[utoipa::path(
    post,
    path = "/api/extract-pdf",
    request_body(content_type = "multipart/form-data", description = "PDF in the `file` field"),
    responses(
        (status = 200, description = "Extracted text and counts", body = ExtractPdfResponse),
        (status = 400, description = "Missing, non-PDF or corrupted file"),
        (status = 413, description = "Upload too large")
    ),
    tag = "documents"
)]
pub async fn extract_pdf(multipart: Multipart) -> Result<Json<ExtractPdfResponse>> {
    let upload = read_pdf_upload(multipart).await?;
    let text = extract_text(upload.bytes).await?;
    let metadata = TextStats::from_text(&text);

    tracing::info!(
        filename = %upload.filename,
        chars = metadata.char_count,
        words = metadata.word_count,
        "Extracted PDF text"
    );

    Ok(Json(ExtractPdfResponse {
        success: true,
        filename: upload.filename,
        text,
        metadata,
    }))
}
